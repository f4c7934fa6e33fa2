//! Portfolio Shelf CLI
//!
//! Export book geometry and inspect gallery content.

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use portfolio_shelf::{
    build_rounded_box, export_glb, load_catalog, load_catalog_from_str, BoxSpec, ContentCatalog,
    ImageFileResolver, Language, ObjExport, SnapAnimator, TranslationCatalog, View, Viewer,
    ViewerConfig,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "portfolio-shelf")]
#[command(author, version, about = "Book geometry and gallery tools for a 3D portfolio shelf", long_about = None)]
struct Cli {
    /// Viewer config JSON (defaults apply to anything it omits)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a rounded box and export it
    Box {
        /// Width along x (defaults to the configured book)
        #[arg(long)]
        width: Option<f32>,

        /// Height along y
        #[arg(long)]
        height: Option<f32>,

        /// Thickness along z
        #[arg(long)]
        thickness: Option<f32>,

        /// Corner radius
        #[arg(short, long)]
        radius: Option<f32>,

        /// Wedges per rounded corner
        #[arg(short, long)]
        smoothness: Option<u32>,

        /// Clamp radius and smoothness into range instead of failing
        #[arg(long)]
        clamp: bool,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "glb")]
        format: OutputFormat,
    },

    /// Print gallery layout for one book
    Layout {
        /// Translation bundle directory, or a single JSON file keyed by language
        #[arg(long)]
        content: PathBuf,

        /// Directory the asset base URL maps to
        #[arg(long)]
        assets: PathBuf,

        /// Book index
        #[arg(short, long)]
        book: usize,

        /// Language tag (e.g., "es" or "pt-BR")
        #[arg(short, long)]
        language: Option<String>,

        /// Image to center on
        #[arg(long, default_value = "0")]
        current: usize,
    },

    /// Show information about translation bundles
    Info {
        /// Translation bundle directory, or a single JSON file keyed by language
        #[arg(long)]
        content: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Binary glTF format
    Glb,
    /// Wavefront OBJ format
    Obj,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };

    match cli.command {
        Commands::Box {
            width,
            height,
            thickness,
            radius,
            smoothness,
            clamp,
            output,
            format,
        } => {
            let book = config.book;
            let mut spec = BoxSpec::new(
                width.unwrap_or(book.width),
                height.unwrap_or(book.height),
                thickness.unwrap_or(book.thickness),
                radius.unwrap_or(book.corner_radius),
                smoothness.unwrap_or(book.smoothness),
            );
            if clamp {
                spec = spec.clamped();
            }
            export_box(&spec, &output, format)?;
        }
        Commands::Layout {
            content,
            assets,
            book,
            language,
            current,
        } => {
            let config = match language {
                Some(tag) => config.with_language(&tag),
                None => config,
            };
            show_layout(config, &content, &assets, book, current)?;
        }
        Commands::Info { content } => {
            show_content_info(&content)?;
        }
    }

    Ok(())
}

fn read_catalog(path: &Path) -> Result<TranslationCatalog, Box<dyn std::error::Error>> {
    info!("Loading content from {:?}...", path);
    let catalog = if path.is_dir() {
        load_catalog(path)?
    } else {
        load_catalog_from_str(&fs::read_to_string(path)?)?
    };
    Ok(catalog)
}

fn export_box(spec: &BoxSpec, path: &Path, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = build_rounded_box(spec)?;
    println!(
        "Built {}x{}x{} box (r={}, s={}): {} vertices, {} triangles",
        spec.width,
        spec.height,
        spec.thickness,
        spec.corner_radius,
        spec.smoothness,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    for group in &mesh.groups {
        println!(
            "  {:>5}: start {:>5}, {} triangles",
            group.slot.name(),
            group.start,
            group.triangle_count
        );
    }

    match format {
        OutputFormat::Glb => {
            let glb_path = if path.extension().is_some() {
                path.to_path_buf()
            } else {
                path.with_extension("glb")
            };
            let glb_data = export_glb(&mesh)?;
            fs::write(&glb_path, &glb_data)?;
            println!("Exported GLB ({} bytes) to {:?}", glb_data.len(), glb_path);
        }
        OutputFormat::Obj => {
            let obj_path = if path.extension().is_some() {
                path.to_path_buf()
            } else {
                path.with_extension("obj")
            };
            let name = obj_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("book");
            let export = ObjExport::from_mesh(&mesh, name)?;
            let dir = obj_path.parent().unwrap_or_else(|| Path::new("."));
            export.write_to_dir(dir)?;
            println!("Exported OBJ to {:?}", dir.join(format!("{}.obj", name)));
            println!("  Material: {:?}", dir.join(format!("{}.mtl", name)));
        }
    }

    Ok(())
}

fn show_layout(
    config: ViewerConfig,
    content: &Path,
    assets: &Path,
    book: usize,
    current: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = read_catalog(content)?;
    let base_url = config.assets.base_url.clone();
    let mut viewer = Viewer::new(config, catalog, SnapAnimator::new())?;

    let title = viewer.book(book)?.title.clone();
    if !viewer.select_book(book) {
        return Err(format!("Book {} cannot be opened", book).into());
    }
    viewer.resolve_pending(&mut ImageFileResolver::new(assets, base_url));
    for _ in 0..current {
        if !viewer.next() {
            break;
        }
    }
    viewer.advance();

    let View::Gallery(gallery) = viewer.frame().view else {
        return Err("Gallery did not open".into());
    };

    println!("Book {}: {} ({})", book, title, viewer.catalog().language());
    if gallery.placeholder {
        println!("  No images available");
        return Ok(());
    }
    for (i, tile) in gallery.tiles.iter().enumerate() {
        println!(
            "  {}{:>2}: x {:>8.3}  width {:>6.3}  {}",
            if tile.current { '*' } else { ' ' },
            i,
            tile.position.x,
            tile.width,
            tile.source_ref
        );
    }
    if let Some(caption) = gallery.caption {
        println!(
            "Current: {} | {} | {} | {}",
            caption.title, caption.date, caption.technique, caption.size
        );
    }

    Ok(())
}

fn show_content_info(content: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = read_catalog(content)?;

    println!("\nContent Info:");
    for language in catalog.languages() {
        let Some(bundle) = catalog.bundle(language) else {
            continue;
        };
        let images: usize = bundle
            .books
            .iter()
            .map(|b| b.content.iter().filter(|c| c.has_image()).count())
            .sum();
        println!(
            "  {}: {} books, {} images, {} strings",
            language,
            bundle.books.len(),
            images,
            bundle.strings.len()
        );
    }
    if catalog.bundle(Language::FALLBACK).is_none() {
        println!("  (no '{}' fallback bundle)", Language::FALLBACK);
    }

    catalog.set_language(Language::FALLBACK);
    for index in 0..catalog.book_count() {
        if let Some(book) = catalog.book(index) {
            println!("  [{}] {} ({} entries)", index, book.title, book.content.len());
        }
    }

    Ok(())
}
