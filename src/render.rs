//! Plot scripts and the renderer that turns them into PDFs.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A gnuplot script: a list of directives followed by one `plot` clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlotScript {
    directives: Vec<String>,
    series: Vec<String>,
}

impl PlotScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directive(&mut self, directive: impl Into<String>) -> &mut Self {
        self.directives.push(directive.into());
        self
    }

    /// Add a series reading columns from `datafile`.
    pub fn series(&mut self, datafile: &Path, style: &str, title: &str) -> &mut Self {
        self.series.push(format!(
            "\"{}\" {} title \"{}\"",
            escape(&datafile.display().to_string()),
            style,
            escape(title)
        ));
        self
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn render(&self) -> String {
        let mut script = String::new();
        for directive in &self.directives {
            script.push_str(directive);
            script.push_str("; ");
        }
        script.push_str("plot ");
        script.push_str(&self.series.join(", "));
        script.push('\n');
        script
    }
}

fn escape(title: &str) -> String {
    title.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Something that can turn a plot script into an output file.
pub trait Render {
    fn render(&self, script: &str, output: &Path) -> Result<()>;
}

/// Runs gnuplot with the script on stdin and its stdout redirected to the
/// output file.
#[derive(Debug, Clone)]
pub struct Gnuplot {
    program: PathBuf,
}

impl Gnuplot {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for Gnuplot {
    fn default() -> Self {
        Self::new("gnuplot")
    }
}

impl Render for Gnuplot {
    fn render(&self, script: &str, output: &Path) -> Result<()> {
        let result = self.run(script, output);
        if result.is_err() {
            // no partial plots
            let _ = std::fs::remove_file(output);
        }
        result
    }
}

impl Gnuplot {
    fn run(&self, script: &str, output: &Path) -> Result<()> {
        let failed = |reason: String| Error::Render {
            output: output.to_path_buf(),
            reason,
        };

        let file = File::create(output)?;
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::from(file))
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(format!("failed to spawn {}: {}", self.program.display(), e)))?;

        // stdin is dropped after the write so gnuplot sees EOF
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(script.as_bytes()),
            None => Err(std::io::Error::other("stdin not captured")),
        };

        // always reap the child so its exit status and stderr are reported
        let result = child.wait_with_output()?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(failed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                result.status,
                stderr.trim()
            )));
        }
        written.map_err(|e| failed(format!("failed to write script: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_joins_directives_and_series() {
        let mut script = PlotScript::new();
        script
            .directive("set terminal pdf size 6cm,4cm")
            .directive("set logscale x")
            .series(Path::new("/tmp/a"), "using 1:2 with lines lw 2 dt 2", "100")
            .series(Path::new("/tmp/b"), "using 1:2 with lines lw 2 dt 3", "200");

        assert_eq!(script.series_count(), 2);
        assert_eq!(
            script.render(),
            "set terminal pdf size 6cm,4cm; set logscale x; plot \
             \"/tmp/a\" using 1:2 with lines lw 2 dt 2 title \"100\", \
             \"/tmp/b\" using 1:2 with lines lw 2 dt 3 title \"200\"\n"
        );
    }

    #[test]
    fn titles_are_escaped() {
        let mut script = PlotScript::new();
        script.series(Path::new("d"), "using 1:2", "say \"hi\"");
        assert!(script.render().contains("title \"say \\\"hi\\\"\""));
    }

    #[test]
    fn datafile_paths_are_escaped() {
        let mut script = PlotScript::new();
        script.series(Path::new("/tmp/a\"b"), "using 1:2", "t");
        assert!(script.render().contains("plot \"/tmp/a\\\"b\" using 1:2"));
    }

    #[test]
    fn missing_program_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let gnuplot = Gnuplot::new(dir.path().join("no-such-gnuplot"));
        let err = gnuplot
            .render("plot x", &dir.path().join("out.pdf"))
            .unwrap_err();
        assert!(matches!(err, Error::Render { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn stdout_is_redirected_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        Gnuplot::new("cat").render("plot x\n", &output).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "plot x\n");
    }

    #[cfg(unix)]
    #[test]
    fn early_exit_reports_status_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        // sh exits after the first line, long before the rest of the
        // script fits through the pipe
        let mut body = String::from("echo 'line 0: bad directive' >&2; exit 3\n");
        body.push_str(&"# set xlabel \"x\"\n".repeat(1 << 16));
        let err = Gnuplot::new("sh")
            .render(&body, &dir.path().join("out.pdf"))
            .unwrap_err();
        match err {
            Error::Render { reason, .. } => {
                assert!(reason.contains("bad directive"), "{reason}");
                assert!(!reason.contains("failed to write script"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.path().join("out.pdf").exists());
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Gnuplot::new("false")
            .render("plot x\n", &dir.path().join("out.pdf"))
            .unwrap_err();
        assert!(matches!(err, Error::Render { .. }));
        assert!(!dir.path().join("out.pdf").exists());
    }
}
