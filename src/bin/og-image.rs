use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "og-image",
    version,
    about = "Render the SaneApps social-preview card to og-image.png next to this executable"
)]
struct Cli {}

fn main() -> anyhow::Result<()> {
    let _cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    let opts = og_image::RenderOpts::beside_executable()?;
    let rendered = og_image::render_og_image(&opts)?;

    println!("OG image saved to {}", rendered.path.display());
    Ok(())
}
