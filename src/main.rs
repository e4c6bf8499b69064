mod app;

use anyhow::{bail, Context};
use app::{AnnotateApp, SessionOptions};
use eframe::egui;
use std::path::PathBuf;
use stomata_annotate::config::EditorConfig;

const USAGE: &str = "Usage: stomata-annotate <image> [--config <file.json>] [--readonly] \
                     [--differential] [--server <base-url>]";

struct Args {
    image_path: PathBuf,
    config_path: Option<PathBuf>,
    readonly: bool,
    differential: bool,
    server: Option<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut image_path = None;
    let mut config_path = None;
    let mut readonly = false;
    let mut differential = false;
    let mut server = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = Some(PathBuf::from(args.next().context("--config needs a path")?))
            }
            "--server" => server = Some(args.next().context("--server needs a URL")?),
            "--readonly" => readonly = true,
            "--differential" => differential = true,
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
            _ if image_path.is_none() => image_path = Some(PathBuf::from(&arg)),
            _ => bail!("unexpected argument {arg}\n{USAGE}"),
        }
    }

    Ok(Args {
        image_path: image_path.context(USAGE)?,
        config_path,
        readonly,
        differential,
        server,
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = parse_args(std::env::args().skip(1))?;
    if !args.image_path.exists() {
        bail!("File not found: {}", args.image_path.display());
    }

    let config = match &args.config_path {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    log::info!("margin {}, marker radius {}", config.margin, config.display_radius);

    let options = SessionOptions {
        config,
        readonly: args.readonly,
        differential: args.differential,
        server: args.server,
    };

    let title = format!(
        "stomata-annotate — {}",
        args.image_path
            .file_name()
            .unwrap_or_default()
            .to_str()
            .unwrap_or("")
    );

    let native = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(&title),
        ..Default::default()
    };

    let image_path = args.image_path;
    eframe::run_native(
        &title,
        native,
        Box::new(move |_cc| Ok(Box::new(AnnotateApp::new(image_path, options)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run eframe: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_flags() {
        let parsed = parse_args(args(&[
            "leaf.png",
            "--readonly",
            "--server",
            "http://localhost:9000",
            "--config",
            "annotate.json",
        ]))
        .unwrap();
        assert_eq!(parsed.image_path, PathBuf::from("leaf.png"));
        assert!(parsed.readonly);
        assert!(!parsed.differential);
        assert_eq!(parsed.server.as_deref(), Some("http://localhost:9000"));
        assert_eq!(parsed.config_path, Some(PathBuf::from("annotate.json")));
    }

    #[test]
    fn rejects_missing_image_and_unknown_flags() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["leaf.png", "--zoom"])).is_err());
        assert!(parse_args(args(&["leaf.png", "--server"])).is_err());
    }
}
