use super::{check_region, parse_faidx_response, region_string, NucleotideSource};
use crate::error::Unavailable;
use crate::utils::external_tools::{run_checked, run_with_timeout};
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// `samtools faidx` executed inside a docker container.
///
/// A container started by [`ContainerSource::start`] belongs to this
/// source and is removed when the source is dropped. Containers joined
/// with [`ContainerSource::attach`] are left running.
#[derive(Debug)]
pub struct ContainerSource {
    docker: String,
    container: String,
    owned: bool,
    samtools: String,
    reference: PathBuf,
    timeout: Duration,
}

impl ContainerSource {
    /// Use an already running container. `reference` is the path as seen
    /// from inside the container.
    pub fn attach(
        docker: &str,
        container: &str,
        samtools: &str,
        reference: &Path,
        timeout: Duration,
    ) -> Result<Self> {
        let source = ContainerSource {
            docker: docker.to_string(),
            container: container.to_string(),
            owned: false,
            samtools: samtools.to_string(),
            reference: reference.to_path_buf(),
            timeout,
        };
        source.probe()?;
        Ok(source)
    }

    /// Start a detached container from `image` with the reference
    /// directory mounted read-only at the same path.
    pub fn start(
        docker: &str,
        image: &str,
        samtools: &str,
        reference: &Path,
        timeout: Duration,
    ) -> Result<Self> {
        let reference = reference
            .canonicalize()
            .with_context(|| format!("Reference FASTA not found at {}", reference.display()))?;
        let mount_dir = reference
            .parent()
            .ok_or_else(|| anyhow!("Reference {} has no parent directory", reference.display()))?;
        let mount = format!("{}:{}:ro", mount_dir.display(), mount_dir.display());

        let output = run_checked(
            Command::new(docker).args(["run", "-d", "--rm", "-v", mount.as_str(), image, "sleep", "infinity"]),
            &format!("{} run {}", docker, image),
        )?;
        let container = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if container.is_empty() {
            anyhow::bail!("{} run {} did not report a container id", docker, image);
        }
        log::info!("Started lookup container {} from {}", short_id(&container), image);

        // Constructed before probing so a failed probe still removes it.
        let source = ContainerSource {
            docker: docker.to_string(),
            container,
            owned: true,
            samtools: samtools.to_string(),
            reference,
            timeout,
        };
        source.probe()?;
        Ok(source)
    }

    fn probe(&self) -> Result<()> {
        run_checked(
            Command::new(&self.docker).args(["exec", self.container.as_str(), self.samtools.as_str(), "--version"]),
            &format!("{} inside container {}", self.samtools, short_id(&self.container)),
        )?;
        let fai = format!("{}.fai", self.reference.display());
        run_checked(
            Command::new(&self.docker).args(["exec", self.container.as_str(), "test", "-f", fai.as_str()]),
            &format!("locating {} inside container {}", fai, short_id(&self.container)),
        )?;
        Ok(())
    }
}

impl NucleotideSource for ContainerSource {
    fn fetch(&self, contig: &str, start: u64, end: u64) -> Result<String, Unavailable> {
        check_region(contig, start, end)?;
        let mut cmd = Command::new(&self.docker);
        cmd.arg("exec")
            .arg(&self.container)
            .arg(&self.samtools)
            .arg("faidx")
            .arg(&self.reference)
            .arg(region_string(contig, start, end));
        let output = run_with_timeout(&mut cmd, self.timeout)?;
        parse_faidx_response(&output.stdout, &output.stderr)
    }

    fn describe(&self) -> String {
        format!(
            "{} faidx {} in container {}",
            self.samtools,
            self.reference.display(),
            short_id(&self.container)
        )
    }
}

impl Drop for ContainerSource {
    fn drop(&mut self) {
        if !self.owned {
            return;
        }
        match Command::new(&self.docker)
            .args(["rm", "-f", self.container.as_str()])
            .output()
        {
            Ok(out) if out.status.success() => {
                log::info!("Removed lookup container {}", short_id(&self.container))
            }
            Ok(out) => log::warn!(
                "Failed to remove container {}: {}",
                short_id(&self.container),
                String::from_utf8_lossy(&out.stderr).trim()
            ),
            Err(e) => log::warn!("Failed to remove container {}: {}", short_id(&self.container), e),
        }
    }
}

fn short_id(id: &str) -> &str {
    if id.len() > 12 && id.chars().all(|c| c.is_ascii_hexdigit()) {
        &id[..12]
    } else {
        id
    }
}
