use crate::config::Config;
use crate::reference::{Backend, LookupSettings};
use crate::types::RecordFormat;
use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert indels between dash ('-') and reference-anchored notation
    Convert {
        /// Input file (plain or compressed)
        #[arg(short = 'i', long = "in-file", alias = "in_file")]
        in_file: PathBuf,

        /// Output file; a .gz suffix writes gzip
        #[arg(short = 'o', long = "out-file", alias = "out_file")]
        out_file: PathBuf,

        /// Input record layout
        #[arg(long = "format", alias = "type", value_enum, default_value = "txt")]
        format: RecordFormat,

        /// Convert anchored indels to dash notation (no reference lookups);
        /// without it dash indels are anchored using the reference
        #[arg(long = "to-dash", alias = "to_dash")]
        to_dash: bool,

        /// Worker threads (overrides the config file)
        #[arg(short = 't', long)]
        threads: Option<usize>,

        /// Write run statistics as JSON to this path
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Hide the progress spinner
        #[arg(short = 'q', long)]
        quiet: bool,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Look up reference regions (e.g. chr1:13417 or 1:10144-10145)
    Fetch {
        /// Regions to fetch, 1-based inclusive
        #[arg(required = true)]
        regions: Vec<String>,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Check that the configured reference backend answers
    Check {
        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Write a config file with default settings
    InitConfig {
        /// Destination (defaults to the user config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Options shared by every command that touches the reference.
#[derive(ClapArgs, Debug, Clone)]
pub struct LookupArgs {
    /// Reference FASTA, indexed with `samtools faidx`
    #[arg(short = 'r', long = "reference", alias = "in_reference")]
    pub reference: PathBuf,

    /// How reference bases are looked up
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// samtools executable
    #[arg(long, alias = "cmd_samtools")]
    pub samtools: Option<String>,

    /// Running container to exec into (container backend)
    #[arg(long)]
    pub container: Option<String>,

    /// Image to start when no container is given (container backend)
    #[arg(long)]
    pub image: Option<String>,

    /// docker executable
    #[arg(long)]
    pub docker: Option<String>,

    /// Seconds before a single lookup is abandoned
    #[arg(long = "timeout")]
    pub timeout_secs: Option<u64>,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl LookupArgs {
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::from_file(path),
            None => Ok(Config::load()),
        }
    }

    /// Command line values win over the config file.
    pub fn settings(&self, config: &Config) -> LookupSettings {
        LookupSettings {
            backend: self.backend.unwrap_or(config.backend),
            reference: self.reference.clone(),
            samtools: self.samtools.clone().unwrap_or_else(|| config.samtools.clone()),
            docker: self.docker.clone().unwrap_or_else(|| config.docker.clone()),
            image: self.image.clone().unwrap_or_else(|| config.image.clone()),
            container: self.container.clone(),
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(config.lookup_timeout_secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_legacy_option_names() {
        let args = Args::try_parse_from([
            "indel-converter",
            "convert",
            "--in_file",
            "in.txt",
            "--out_file",
            "out.txt",
            "--in_reference",
            "ucsc.hg19.fasta",
            "--type",
            "vcf",
            "--to_dash",
            "--cmd_samtools",
            "/opt/bin/samtools",
        ])
        .unwrap();

        match args.command {
            Commands::Convert {
                format,
                to_dash,
                lookup,
                ..
            } => {
                assert_eq!(format, RecordFormat::Vcf);
                assert!(to_dash);
                assert_eq!(lookup.samtools.as_deref(), Some("/opt/bin/samtools"));
                assert_eq!(lookup.reference, PathBuf::from("ucsc.hg19.fasta"));
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn flags_override_config_values() {
        let args = Args::try_parse_from([
            "indel-converter",
            "check",
            "-r",
            "ref.fa",
            "--backend",
            "fasta",
            "--timeout",
            "5",
        ])
        .unwrap();
        let Commands::Check { lookup } = args.command else {
            panic!("expected check");
        };

        let config = Config {
            samtools: "/usr/local/bin/samtools".to_string(),
            ..Config::default()
        };
        let settings = lookup.settings(&config);
        assert_eq!(settings.backend, Backend::Fasta);
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.samtools, "/usr/local/bin/samtools");
        assert!(settings.container.is_none());
    }
}
