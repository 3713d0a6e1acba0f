use clap::Parser;

/// Backend bridging a proprietary messaging provider to a local frontend.
#[derive(Parser)]
#[command(name = "chatbridge", version, about)]
struct Args {
    /// Raise log verbosity to debug
    #[arg(short, long)]
    debug: bool,

    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0")]
    address: String,

    /// Port to bind the HTTP server to
    #[arg(long, default_value_t = 8050)]
    port: u16,
}

#[rocket::main]
async fn main() -> Result<(), rocket::Error> {
    let args = Args::parse();
    chatbridge::init_logger(args.debug);

    log::info!("starting chat bridge server on {}:{}", args.address, args.port);

    let figment = rocket::Config::figment()
        .merge(("address", args.address))
        .merge(("port", args.port));

    let _rocket = chatbridge::rocket().configure(figment).launch().await?;
    Ok(())
}
