use clap::{Args, Subcommand};

use gymlog::config::{Backend, Config};

use super::OutputFormat;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => print!("{}", render_config(config)),
                }
                Ok(())
            }
        }
    }
}

fn render_config(config: &Config) -> String {
    let mut out = String::new();
    out.push_str("Configuration\n");
    out.push_str("=============\n\n");

    match &config.config_file {
        Some(path) => out.push_str(&format!("Config file: {}\n", path.display())),
        None => out.push_str(&format!(
            "Config file: {} (not found)\n",
            Config::default_config_path().display()
        )),
    }
    out.push('\n');

    out.push_str(&format!("backend: {}\n", config.backend.value));
    out.push_str(&format!("  source: {}\n\n", config.backend.source));

    out.push_str(&format!(
        "database_path: {}\n",
        config.database_path.value.display()
    ));
    out.push_str(&format!("  source: {}\n\n", config.database_path.source));

    out.push_str(&format!(
        "session_path: {}\n",
        config.session_path.value.display()
    ));
    out.push_str(&format!("  source: {}\n", config.session_path.source));

    if config.backend.value == Backend::Remote || config.remote.url.is_some() {
        out.push('\n');
        out.push_str(&format!(
            "remote.url: {}\n",
            config.remote.url.as_deref().unwrap_or("(not set)")
        ));
        // Never echo the key itself
        let key_state = if config.remote.api_key.is_some() {
            "(set)"
        } else {
            "(not set)"
        };
        out.push_str(&format!("remote.api_key: {}\n", key_state));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_render_local_config() {
        let temp_dir = tempdir().unwrap();
        let config = Config::load(Some(temp_dir.path().join("missing.yaml"))).unwrap();

        let text = render_config(&config);
        assert!(text.contains("(not found)"));
        assert!(text.contains("backend: local\n  source: default"));
        assert!(!text.contains("remote.url"));
    }

    #[test]
    fn test_render_hides_api_key() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "backend: remote").unwrap();
        writeln!(file, "remote:").unwrap();
        writeln!(file, "  url: https://project.example.co").unwrap();
        writeln!(file, "  api_key: super-secret").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        let text = render_config(&config);

        assert!(text.contains("backend: remote\n  source: file"));
        assert!(text.contains("remote.url: https://project.example.co"));
        assert!(text.contains("remote.api_key: (set)"));
        assert!(!text.contains("super-secret"));
    }
}
