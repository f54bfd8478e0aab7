use super::Host;
use super::config::{CONFIG_FILE_NAME, Config};
use crate::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use ohno::bail;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output configuration file path (default is `repo-scout.toml` in the current directory)
    #[arg(value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn init_config<H: Host>(host: &mut H, args: &InitArgs) -> Result<()> {
    let output = args.output.clone().unwrap_or_else(|| Utf8PathBuf::from(CONFIG_FILE_NAME));

    if output.exists() && !args.force {
        let _ = writeln!(host.error(), "'{output}' already exists, use --force to overwrite it");
        host.exit(1);
        bail!("'{output}' already exists");
    }

    Config::save_default(&output)?;
    let _ = writeln!(host.output(), "Generated default configuration file: {output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;

    fn output_in(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(dir.path().join("scout.toml")).unwrap()
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let output = output_in(&dir);
        let mut host = TestHost::new();

        init_config(
            &mut host,
            &InitArgs {
                output: Some(output.clone()),
                force: false,
            },
        )
        .unwrap();

        assert!(host.output_text().contains("scout.toml"));
        let base = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        let _ = Config::load(&base, Some(&output)).unwrap();
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let output = output_in(&dir);
        std::fs::write(&output, "keep me").unwrap();
        let mut host = TestHost::new();

        let result = init_config(
            &mut host,
            &InitArgs {
                output: Some(output.clone()),
                force: false,
            },
        );

        assert!(result.is_err());
        assert_eq!(host.exit_code, Some(1));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "keep me");
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let output = output_in(&dir);
        std::fs::write(&output, "old").unwrap();
        let mut host = TestHost::new();

        init_config(
            &mut host,
            &InitArgs {
                output: Some(output.clone()),
                force: true,
            },
        )
        .unwrap();

        assert_ne!(std::fs::read_to_string(&output).unwrap(), "old");
    }
}
