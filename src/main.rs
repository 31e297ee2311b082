#[actix_web::main]
async fn main() -> std::io::Result<()> {
    voucher_server::run().await
}
