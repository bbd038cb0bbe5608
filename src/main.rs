//! ZIG ZAG CLI - serve the art API or render pieces straight to disk.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};
use zigzag::config::ZigzagConfig;
use zigzag::contract::{self, ContractKind};
use zigzag::metadata::{self, NftMetadata};
use zigzag::{Complexity, GenerationRequest, Generator, PaletteKind, ProceduralGenerator, StyleKind};

#[derive(Parser)]
#[command(name = "zigzag")]
#[command(about = "Procedural NFT art generator and minting service")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(long, default_value = "zigzag.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Render a single piece to a PNG
    Generate {
        /// Visual style
        #[arg(short, long, value_enum)]
        style: Option<StyleArg>,

        /// Palette name (Rainbow, Neon, Pastel, Dark)
        #[arg(short, long)]
        palette: Option<String>,

        /// Complexity, clamped to 1-10
        #[arg(short, long)]
        complexity: Option<i64>,

        /// Seed for generation
        #[arg(short = 'S', long)]
        seed: Option<u64>,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also save NFT metadata as JSON
        #[arg(long)]
        save_metadata: bool,
    },

    /// Render every style in every palette
    Showcase {
        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Seed for consistent results
        #[arg(short = 'S', long, default_value = "42")]
        seed: u64,

        /// Complexity, clamped to 1-10
        #[arg(short, long)]
        complexity: Option<i64>,
    },

    /// Print or save a Solidity contract template
    Contract {
        /// Contract kind (erc721, erc20, erc1155, custom)
        #[arg(short, long, default_value = "erc721")]
        kind: String,

        /// Token name
        #[arg(short, long, default_value = "")]
        name: String,

        /// Token symbol
        #[arg(short = 'y', long, default_value = "")]
        symbol: String,

        /// Output file path, stdout if absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum, Debug)]
enum StyleArg {
    /// Concentric rainbow rings and orbiting dots
    Psychedelic,
    /// Translucent overlapping shapes
    Abstract,
    /// Grid of squares and circles
    Geometric,
    /// Neon grid with glowing lines
    Cyberpunk,
}

impl StyleArg {
    fn to_style(self) -> StyleKind {
        match self {
            StyleArg::Psychedelic => StyleKind::Psychedelic,
            StyleArg::Abstract => StyleKind::Abstract,
            StyleArg::Geometric => StyleKind::Geometric,
            StyleArg::Cyberpunk => StyleKind::Cyberpunk,
        }
    }
}

fn write_piece(generator: &ProceduralGenerator, seed: u64, path: &Path) -> Result<()> {
    let artwork = generator.artwork(seed)?;
    fs::write(path, &artwork.png).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("zigzag=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ZigzagConfig::load(&cli.config)?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            zigzag::server::serve(&config).await?;
        }

        Commands::Generate {
            style,
            palette,
            complexity,
            seed,
            output,
            save_metadata,
        } => {
            let style = match style {
                Some(style) => style.to_style(),
                None => config.render.style.parse()?,
            };
            let palette = PaletteKind::lookup(palette.as_deref().unwrap_or(&config.render.palette));
            let complexity = Complexity::clamped(complexity.unwrap_or(config.render.complexity));
            let seed = seed.unwrap_or_else(rand::random);

            let request = GenerationRequest::new(style, palette, complexity);
            let generator = ProceduralGenerator::new(request);

            println!(
                "Generating {} in {} at complexity {} with seed {}...",
                style, palette, complexity, seed
            );

            let output_dir = PathBuf::from(&config.output.directory);
            fs::create_dir_all(&output_dir)?;

            let id = metadata::generate_id(&mut rand::rngs::StdRng::seed_from_u64(seed));
            let output_path = output.unwrap_or_else(|| {
                output_dir.join(format!(
                    "zigzag_{}_{}.{}",
                    generator.name().to_lowercase(),
                    seed,
                    generator.extension()
                ))
            });

            write_piece(&generator, seed, &output_path)?;
            println!("Saved to {}", output_path.display());

            if save_metadata {
                let metadata_path = output_path.with_extension("json");
                let json = serde_json::to_string_pretty(&NftMetadata::for_request(&id, &request))?;
                fs::write(&metadata_path, json)?;
                println!("Saved metadata to {}", metadata_path.display());
            }
        }

        Commands::Showcase {
            output_dir,
            seed,
            complexity,
        } => {
            let output_dir = output_dir
                .unwrap_or_else(|| PathBuf::from(&config.output.directory).join("showcase"));
            fs::create_dir_all(&output_dir)?;

            let complexity = Complexity::clamped(complexity.unwrap_or(config.render.complexity));
            println!("Generating showcase with seed {}...", seed);

            for style in StyleKind::ALL {
                for palette in PaletteKind::ALL {
                    let generator =
                        ProceduralGenerator::new(GenerationRequest::new(style, palette, complexity));
                    let filename = format!(
                        "{}_{}.{}",
                        generator.name().to_lowercase(),
                        palette.name().to_lowercase(),
                        generator.extension()
                    );
                    write_piece(&generator, seed, &output_dir.join(&filename))?;
                    println!("  Created {}", filename);
                }
            }

            println!("Done! Showcase saved to {}", output_dir.display());
        }

        Commands::Contract {
            kind,
            name,
            symbol,
            output,
        } => {
            let kind: ContractKind = kind.parse()?;
            let source = contract::template(kind, &name, &symbol);
            match output {
                Some(path) => {
                    fs::write(&path, source)?;
                    println!("Saved {} contract to {}", kind, path.display());
                }
                None => print!("{source}"),
            }
        }
    }

    Ok(())
}
