use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "8088".to_string());
    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    println!("mock SOAP endpoint on http://{}/soap", listener.local_addr()?);
    mock_server::run(listener).await
}
