#[actix_web::main]
async fn main() -> std::io::Result<()> {
    napkin_mcp_server::run().await
}
