use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use envmold::secret_manager::secret_managers;
use envmold::{GlobalConfig, LinePrompt, Mold, Output, SecretManagerRegistry, TagFilter, logging};
use std::path::PathBuf;
use tracing::{debug, info};

/// Main CLI structure for the envmold application.
///
/// Reads a mold template, resolves every variable and writes the result as
/// `export` lines.
#[derive(Parser)]
#[command(name = "envmold", version)]
#[command(about = "Mold a variable template into exported environment variables", long_about = None)]
struct Cli {
    /// Path to the mold template
    #[arg(short, long, env = "ENVMOLD_TEMPLATE")]
    template: Option<PathBuf>,
    /// Where to write the environment: 'stdout' or a file path
    #[arg(short, long, env = "ENVMOLD_OUTPUT")]
    output: Option<String>,
    /// Comma separated tags; tagged variables without a matching tag are skipped
    #[arg(long, env = "ENVMOLD_TAGS")]
    tags: Option<String>,
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
    /// List the available secret managers and exit
    #[arg(long)]
    list_secret_managers: bool,
}

/// The active tag filter: the flag wins over the configured default.
///
/// Without either, no filtering takes place.
fn tag_filter(flag: Option<&str>, config: &GlobalConfig) -> Option<TagFilter> {
    match flag {
        Some(list) => Some(TagFilter::parse_list(list)),
        None => config.defaults.tags.clone().map(TagFilter::new),
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config = GlobalConfig::load()
        .wrap_err("Failed to load envmold configuration")?
        .unwrap_or_default();
    logging::init(cli.debug, config.defaults.log_level.as_deref());
    info!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    if cli.list_secret_managers {
        for info in secret_managers() {
            println!("{}", info.display_with_examples());
        }
        return Ok(());
    }

    let template = config.template(cli.template);
    let output: Output = config.output(cli.output).parse()?;
    let tags = tag_filter(cli.tags.as_deref(), &config);
    debug!(template = %template.display(), %output, ?tags, "Starting run");

    let registry =
        SecretManagerRegistry::builtin(&config).wrap_err("Failed to configure secret managers")?;

    let mut mold = Mold::from_path(&template, tags.as_ref())
        .wrap_err_with(|| format!("Failed to open {}", template.display()))?;
    mold.generate(&registry, &mut LinePrompt::stdio())
        .wrap_err("Failed to create mold")?;

    mold.write_environment(output.writer().as_mut())
        .wrap_err_with(|| {
            format!(
                "Failed to write mold to environment when using writer '{}'",
                output
            )
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_filter_precedence() {
        let mut config = GlobalConfig::default();
        assert_eq!(tag_filter(None, &config), None);

        config.defaults.tags = Some(vec!["backend".to_string()]);
        assert_eq!(tag_filter(None, &config), Some(TagFilter::new(["backend"])));
        assert_eq!(tag_filter(Some("a, b"), &config), Some(TagFilter::new(["a", "b"])));
        assert_eq!(tag_filter(Some(""), &config), Some(TagFilter::default()));
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "envmold",
            "--template",
            "envs/dev.yaml",
            "--output",
            ".env",
            "--tags",
            "backend",
            "--debug",
        ])
        .unwrap();
        assert_eq!(cli.template, Some(PathBuf::from("envs/dev.yaml")));
        assert_eq!(cli.output.as_deref(), Some(".env"));
        assert_eq!(cli.tags.as_deref(), Some("backend"));
        assert!(cli.debug);
        assert!(!cli.list_secret_managers);
    }
}
