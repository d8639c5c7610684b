use clap::{Parser, Subcommand, ValueEnum};
use exif_frame::compositor::ExportMode;
use exif_frame::config::{self, CONFIG_FILENAME, FrameConfig};
use exif_frame::imaging::{RustBackend, load_font};
use exif_frame::layout::{Align, AspectRatio, FrameColor, Template};
use exif_frame::metadata::Field;
use exif_frame::output::{self, InspectReport};
use exif_frame::preview;
use exif_frame::session::Session;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "exif-frame")]
#[command(about = "Frame photos with their shooting metadata")]
#[command(long_about = "\
Frame photos with their shooting metadata

Reads the EXIF tags of a photo, formats them into camera, settings and date
lines, and draws them onto a frame around the photo.

Templates:

  leica      Info band below the photo: camera and date on the left,
             settings and location on the right. Any aspect ratio and colour.
  fujifilm   \"Shot on <camera>\" centred over the settings line.
             Always a white frame.
  cheki      Instant-film card: square photo with a tall band below.
             Always 1:1 and white.

Alignment:

  center     The template's own composition (the default).
  left/right Every line stacked flush against that edge of the band.

Exports:

  screen     PNG at screen.preview_width x screen.pixel_density
  print      JPEG at print.width, print.jpeg_quality

Every field extracted from EXIF can be overridden on the command line.
Run 'exif-frame gen-config' to generate a documented exif-frame.toml.")]
#[command(version = env!("EXIF_FRAME_VERSION"))]
struct Cli {
    /// Config file [default: ./exif-frame.toml, optional]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a photo's tags, extracted fields and display strings
    Inspect {
        #[command(flatten)]
        frame: FrameArgs,
        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,
    },
    /// Render and save the framed photo
    Export {
        #[command(flatten)]
        frame: FrameArgs,
        /// Which export to produce
        #[arg(long, value_enum, default_value_t = ModeArg::Both)]
        mode: ModeArg,
        /// Output directory
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
    },
    /// Write an HTML preview of the framed photo
    Preview {
        #[command(flatten)]
        frame: FrameArgs,
        /// Output directory
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
    },
    /// Print a stock exif-frame.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Screen,
    Print,
    Both,
}

impl ModeArg {
    fn modes(self) -> &'static [ExportMode] {
        match self {
            ModeArg::Screen => &[ExportMode::Screen],
            ModeArg::Print => &[ExportMode::Print],
            ModeArg::Both => &[ExportMode::Screen, ExportMode::Print],
        }
    }
}

/// The photo plus layout selections and field overrides.
#[derive(clap::Args)]
struct FrameArgs {
    /// Photo to frame (JPEG, PNG, TIFF or WebP)
    photo: PathBuf,

    /// Frame template: leica, fujifilm or cheki
    #[arg(long)]
    template: Option<Template>,
    /// Aspect ratio preset, e.g. 3:2 (ignored by templates that lock it)
    #[arg(long)]
    aspect: Option<AspectRatio>,
    /// Frame colour: black or white (ignored by templates that lock it)
    #[arg(long)]
    color: Option<FrameColor>,
    /// Text alignment: left, center or right [default: defaults.align]
    #[arg(long)]
    align: Option<Align>,

    /// Camera label
    #[arg(long)]
    camera: Option<String>,
    /// Shooting date, YYYY-MM-DDTHH:MM[:SS]
    #[arg(long)]
    date: Option<String>,
    /// Shutter speed, e.g. 1/125s
    #[arg(long)]
    shutter: Option<String>,
    /// Aperture, e.g. f/2.8
    #[arg(long)]
    aperture: Option<String>,
    /// ISO, e.g. ISO800
    #[arg(long)]
    iso: Option<String>,
    /// Focal length, e.g. 35mm
    #[arg(long)]
    focal: Option<String>,
    /// Location text (drawn by the leica and cheki templates)
    #[arg(long)]
    location: Option<String>,

    /// Font file for overlay text (overrides [fonts] path)
    #[arg(long)]
    font: Option<PathBuf>,
}

impl FrameArgs {
    fn field_overrides(&self) -> [(Field, Option<&String>); 7] {
        [
            (Field::Camera, self.camera.as_ref()),
            (Field::ShootingDateTime, self.date.as_ref()),
            (Field::ShutterSpeed, self.shutter.as_ref()),
            (Field::Aperture, self.aperture.as_ref()),
            (Field::Iso, self.iso.as_ref()),
            (Field::FocalLength, self.focal.as_ref()),
            (Field::Location, self.location.as_ref()),
        ]
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Inspect { frame, json } => {
            let config = resolve_config(cli.config.as_deref())?;
            let session = open_session(config, &frame, false)?;
            let Some(photo) = session.photo() else {
                return Err("no photo loaded".into());
            };
            let view = session.view();
            let display = session.display();
            if json {
                let (width, height) = photo.dimensions();
                let report = InspectReport {
                    name: &photo.name,
                    mime_type: &photo.mime_type,
                    size_bytes: photo.size_bytes,
                    width,
                    height,
                    tags: &photo.tags,
                    fields: session.fields(),
                    record: session.record(),
                    display,
                    layout: view,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_inspect(photo, session.fields(), &display, &view);
            }
        }
        Command::Export {
            frame,
            mode,
            output: out_dir,
        } => {
            let config = resolve_config(cli.config.as_deref())?;
            let session = open_session(config, &frame, true)?;
            for &mode in mode.modes() {
                let artifact = session.export(mode)?;
                let path = artifact.write_to(&out_dir)?;
                output::print_export(&artifact, &path);
            }
        }
        Command::Preview {
            frame,
            output: out_dir,
        } => {
            let config = resolve_config(cli.config.as_deref())?;
            let session = open_session(config, &frame, true)?;
            std::fs::create_dir_all(&out_dir)?;
            let photo_src = preview::photo_src(
                &std::fs::canonicalize(&frame.photo)?,
                &std::fs::canonicalize(&out_dir)?,
            );
            let markup = preview::render_preview(&session, Some(&photo_src));
            let path = out_dir.join("photo_frame_preview.html");
            std::fs::write(&path, markup.into_string())?;
            output::print_preview(&path, session.has_font());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// An explicit `--config` must exist; the default location is optional.
fn resolve_config(explicit: Option<&Path>) -> Result<FrameConfig, Box<dyn std::error::Error>> {
    match explicit {
        Some(path) if !path.exists() => {
            Err(format!("config file not found: {}", path.display()).into())
        }
        Some(path) => Ok(config::load_config(path)?),
        None => Ok(config::load_config(Path::new(CONFIG_FILENAME))?),
    }
}

/// Build a session, load the photo and apply the command-line selections.
fn open_session(
    mut config: FrameConfig,
    args: &FrameArgs,
    with_font: bool,
) -> Result<Session, Box<dyn std::error::Error>> {
    if let Some(font) = &args.font {
        config.fonts.path = Some(font.clone());
    }
    let font = if with_font {
        load_font(config.fonts.path.as_deref())?
    } else {
        None
    };

    let mut session = Session::new(config, RustBackend::new()).with_font(font);
    session.upload(&args.photo)?;

    if let Some(template) = args.template {
        session.select_template(template);
    }
    if let Some(ratio) = args.aspect {
        if !session.select_aspect_ratio(ratio) {
            warn!(
                template = %session.view().template,
                "aspect ratio {ratio} ignored, the template locks it"
            );
        }
    }
    if let Some(color) = args.color {
        if !session.select_frame_color(color) {
            warn!(
                template = %session.view().template,
                "frame colour {color} ignored, the template locks it"
            );
        }
    }
    if let Some(align) = args.align {
        session.select_align(align);
    }
    for (field, value) in args.field_overrides() {
        if let Some(value) = value {
            session.set_field(field, value.as_str());
        }
    }

    Ok(session)
}
