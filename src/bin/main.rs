//! Block Asset Compiler CLI
//!
//! Pack block textures and bake blockstates into web viewer data.

use block_asset_compiler::{
    load_asset_bundle, types::parse_property, BlockProperties, Compiler, CompilerConfig,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "block-asset-compiler")]
#[command(author, version, about = "Bake Minecraft block assets into an atlas and vertex buffers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every blockstate and write the web export
    Compile {
        /// Directory containing assets/minecraft
        #[arg(short, long)]
        assets: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Maximum atlas size
        #[arg(long, default_value = "32768")]
        max_atlas_size: u32,

        /// Compile each placement from scratch instead of sharing base geometry
        #[arg(long)]
        no_geometry_cache: bool,
    },

    /// Show information about an asset directory
    Info {
        /// Directory containing assets/minecraft
        #[arg(short, long)]
        assets: PathBuf,
    },

    /// Show the models one blockstate displays for a set of properties
    Block {
        /// Directory containing assets/minecraft
        #[arg(short, long)]
        assets: PathBuf,

        /// Blockstate name (e.g., "oak_stairs")
        #[arg(short, long)]
        name: String,

        /// Block properties as key=value pairs (e.g., "facing=north")
        #[arg(short, long, value_parser = parse_property_arg)]
        property: Vec<(String, String)>,
    },
}

fn parse_property_arg(s: &str) -> Result<(String, String), String> {
    parse_property(s).ok_or_else(|| format!("Invalid property format: '{}'. Use key=value", s))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            assets,
            output,
            max_atlas_size,
            no_geometry_cache,
        } => {
            let config = CompilerConfig::default()
                .with_max_atlas_size(max_atlas_size)
                .with_geometry_cache(!no_geometry_cache);
            compile(&assets, &output, config)?;
        }
        Commands::Info { assets } => {
            show_info(&assets)?;
        }
        Commands::Block {
            assets,
            name,
            property,
        } => {
            show_block(&assets, &name, property.into_iter().collect())?;
        }
    }

    Ok(())
}

fn compile(
    assets_path: &PathBuf,
    output_path: &PathBuf,
    config: CompilerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let bundle = load_asset_bundle(assets_path)?;
    let output = Compiler::with_config(bundle, config).compile();

    output.write_web_export(output_path)?;

    println!(
        "Compiled {} blockstates ({} placements)",
        output.block_states.len(),
        output.model_count()
    );
    println!(
        "  Atlas: {}x{} with {} textures, {} missed",
        output.atlas.side(),
        output.atlas.side(),
        output.atlas.len(),
        output.misses.len()
    );
    if !output.diagnostics.is_empty() {
        println!("  Skipped {} items:", output.diagnostics.len());
        for diagnostic in &output.diagnostics {
            println!("    - {}", diagnostic);
        }
    }

    Ok(())
}

fn show_info(assets_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let bundle = load_asset_bundle(assets_path)?;

    println!("Asset directory: {:?}", assets_path);
    println!("  Blockstates: {}", bundle.blockstate_count());
    println!("  Models: {}", bundle.model_count());
    println!("  Textures: {}", bundle.texture_count());

    let multipart = bundle
        .blockstates
        .values()
        .filter(|definition| definition.is_multipart())
        .count();
    println!("  Multipart blockstates: {}", multipart);

    if !bundle.diagnostics.is_empty() {
        println!("  Unreadable files: {}", bundle.diagnostics.len());
    }

    Ok(())
}

fn show_block(
    assets_path: &PathBuf,
    name: &str,
    properties: BlockProperties,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut bundle = load_asset_bundle(assets_path)?;

    // Only the requested blockstate is compiled
    let definition = bundle
        .blockstates
        .remove(name)
        .ok_or_else(|| format!("No blockstate named '{}'", name))?;
    bundle.blockstates.clear();
    bundle.add_blockstate(name, definition);

    let output = Compiler::new(bundle).compile();
    let state = output
        .block_state(name)
        .ok_or_else(|| format!("No blockstate named '{}'", name))?;

    println!("{} {:?}", name, properties);
    let models = state.models_for(&properties);
    if models.is_empty() {
        println!("  No model applies");
    }
    for model in models {
        let transform = model.transform;
        let bounds = model
            .buffer
            .bounds()
            .map(|b| format!("{:?} -> {:?}", b.min, b.max))
            .unwrap_or_else(|| "empty".to_string());
        println!(
            "  {} x={} y={} uvlock={}: {} faces, {} vertices, tinted: {}, bounds {}",
            model.model,
            transform.x,
            transform.y,
            transform.uvlock,
            model.buffer.face_count(),
            model.buffer.vertex_count(),
            model.buffer.has_tint(),
            bounds
        );
    }

    Ok(())
}
