//! Command templates and the per-sample invocations they expand into.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{Result, error::SweepError};

/// Placeholder replaced by the cluster count in output templates.
pub const CLUSTERS_PLACEHOLDER: &str = "{clusters}";

/// Program launched for every sample by default.
pub const DEFAULT_PROGRAM: &str = "python3";

/// Arguments placed between the program and the generated flags by default.
pub const DEFAULT_LEADING_ARGS: [&str; 2] = ["kmeans.py", "cluster"];

/// Fingerprint file clustered by default.
pub const DEFAULT_INPUT: &str = "chembridge_xp_dock_top10000_parquet.gz";

/// Output filename template used by default.
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "km_{clusters}clustered_top10K_SLC6A14_chembridge.csv";

/// Flag introducing the input file.
pub const DEFAULT_INPUT_FLAG: &str = "--fp_file";

/// Flag introducing the cluster count.
pub const DEFAULT_CLUSTERS_FLAG: &str = "--clusters";

/// Flag introducing the output file.
pub const DEFAULT_OUTPUT_FLAG: &str = "--out";

/// Describes how a cluster count becomes a command line.
///
/// The generated argument list is
/// `<leading args> <input flag> <input> <clusters flag> <n> <output flag> <output>`.
///
/// # Examples
/// ```
/// use kmsweep_core::CommandTemplate;
///
/// let template = CommandTemplate::new("kmeans", "points.gz", "out_{clusters}.csv")
///     .expect("template is valid")
///     .with_leading_args(["cluster"]);
/// let invocation = template.invocation(42);
/// assert_eq!(invocation.output().to_str(), Some("out_42.csv"));
/// assert_eq!(
///     invocation.to_string(),
///     "kmeans cluster --fp_file points.gz --clusters 42 --out out_42.csv",
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    program: OsString,
    leading_args: Vec<OsString>,
    input: PathBuf,
    output_template: String,
    input_flag: String,
    clusters_flag: String,
    output_flag: String,
}

impl Default for CommandTemplate {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.into(),
            leading_args: DEFAULT_LEADING_ARGS.iter().map(OsString::from).collect(),
            input: PathBuf::from(DEFAULT_INPUT),
            output_template: DEFAULT_OUTPUT_TEMPLATE.to_owned(),
            input_flag: DEFAULT_INPUT_FLAG.to_owned(),
            clusters_flag: DEFAULT_CLUSTERS_FLAG.to_owned(),
            output_flag: DEFAULT_OUTPUT_FLAG.to_owned(),
        }
    }
}

impl CommandTemplate {
    /// Creates a template with no leading arguments and the default flag
    /// names.
    ///
    /// # Errors
    /// Returns [`SweepError::EmptyProgram`] when `program` is empty and
    /// [`SweepError::MissingPlaceholder`] when `output_template` does not
    /// contain [`CLUSTERS_PLACEHOLDER`].
    pub fn new(
        program: impl Into<OsString>,
        input: impl Into<PathBuf>,
        output_template: impl Into<String>,
    ) -> Result<Self> {
        let program = program.into();
        if program.is_empty() {
            return Err(SweepError::EmptyProgram);
        }
        let output_template = output_template.into();
        if !output_template.contains(CLUSTERS_PLACEHOLDER) {
            return Err(SweepError::MissingPlaceholder {
                template: output_template,
            });
        }
        Ok(Self {
            program,
            leading_args: Vec::new(),
            input: input.into(),
            output_template,
            ..Self::default()
        })
    }

    /// Replaces the arguments placed before the generated flags.
    #[must_use]
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Overrides the flag that introduces the input file.
    #[must_use]
    pub fn with_input_flag(mut self, flag: impl Into<String>) -> Self {
        self.input_flag = flag.into();
        self
    }

    /// Overrides the flag that introduces the cluster count.
    #[must_use]
    pub fn with_clusters_flag(mut self, flag: impl Into<String>) -> Self {
        self.clusters_flag = flag.into();
        self
    }

    /// Overrides the flag that introduces the output file.
    #[must_use]
    pub fn with_output_flag(mut self, flag: impl Into<String>) -> Self {
        self.output_flag = flag.into();
        self
    }

    /// Returns the program launched for every sample.
    #[must_use]
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Returns the input file passed to every invocation.
    #[must_use]
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Returns the raw output template.
    #[must_use]
    pub fn output_template(&self) -> &str {
        &self.output_template
    }

    /// Substitutes `clusters` into every placeholder of the output template.
    #[must_use]
    pub fn output_for(&self, clusters: i64) -> PathBuf {
        PathBuf::from(
            self.output_template
                .replace(CLUSTERS_PLACEHOLDER, &clusters.to_string()),
        )
    }

    /// Expands the template for a single cluster count.
    #[must_use]
    pub fn invocation(&self, clusters: i64) -> Invocation {
        let output = self.output_for(clusters);
        let mut args = self.leading_args.clone();
        args.extend([
            OsString::from(&self.input_flag),
            self.input.clone().into_os_string(),
            OsString::from(&self.clusters_flag),
            OsString::from(clusters.to_string()),
            OsString::from(&self.output_flag),
            output.clone().into_os_string(),
        ]);
        Invocation {
            clusters,
            program: self.program.clone(),
            args,
            output,
        }
    }
}

/// A single external command derived from one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    clusters: i64,
    program: OsString,
    args: Vec<OsString>,
    output: PathBuf,
}

impl Invocation {
    /// Returns the cluster count this invocation requests.
    #[must_use]
    pub const fn clusters(&self) -> i64 {
        self.clusters
    }

    /// Returns the program to launch.
    #[must_use]
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Returns the full argument list, excluding the program itself.
    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Returns the output file the external program is asked to write.
    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Builds a [`Command`] that inherits the caller's stdio.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

/// Renders the command line as a POSIX shell would read it back.
///
/// Words containing anything beyond letters, digits and `_@%+=:,./-` are
/// single-quoted.
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_shell_word(f, &self.program)?;
        for arg in &self.args {
            f.write_str(" ")?;
            write_shell_word(f, arg)?;
        }
        Ok(())
    }
}

fn write_shell_word(f: &mut fmt::Formatter<'_>, word: &OsStr) -> fmt::Result {
    let word = word.to_string_lossy();
    let is_plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c));
    if is_plain {
        return f.write_str(&word);
    }
    f.write_str("'")?;
    f.write_str(&word.replace('\'', "'\\''"))?;
    f.write_str("'")
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    fn default_template_builds_chembridge_command() {
        let invocation = CommandTemplate::default().invocation(111);
        assert_eq!(
            invocation.to_string(),
            "python3 kmeans.py cluster --fp_file chembridge_xp_dock_top10000_parquet.gz \
             --clusters 111 --out km_111clustered_top10K_SLC6A14_chembridge.csv",
        );
        assert_eq!(
            invocation.output(),
            Path::new("km_111clustered_top10K_SLC6A14_chembridge.csv"),
        );
    }

    #[rstest]
    #[case::prefix("{clusters}.csv", 7, "7.csv")]
    #[case::repeated("{clusters}/k{clusters}.csv", 12, "12/k12.csv")]
    #[case::negative("out_{clusters}", -3, "out_-3")]
    fn output_embeds_decimal_value(
        #[case] template: &str,
        #[case] clusters: i64,
        #[case] expected: &str,
    ) {
        let template = CommandTemplate::new("prog", "in", template).expect("template is valid");
        assert_eq!(template.output_for(clusters), PathBuf::from(expected));
    }

    #[rstest]
    fn new_rejects_template_without_placeholder() {
        let err = CommandTemplate::new("prog", "in", "out.csv").expect_err("must be rejected");
        assert_eq!(
            err,
            SweepError::MissingPlaceholder {
                template: "out.csv".into()
            }
        );
    }

    #[rstest]
    fn new_rejects_empty_program() {
        let err = CommandTemplate::new("", "in", "{clusters}").expect_err("must be rejected");
        assert_eq!(err, SweepError::EmptyProgram);
    }

    #[rstest]
    fn flags_can_be_renamed() {
        let invocation = CommandTemplate::new("prog", "data.parquet", "{clusters}.out")
            .expect("template is valid")
            .with_input_flag("-i")
            .with_clusters_flag("-k")
            .with_output_flag("-o")
            .invocation(5);
        let args: Vec<_> = invocation
            .args()
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, ["-i", "data.parquet", "-k", "5", "-o", "5.out"]);
    }

    #[rstest]
    #[case::space_in_input("my data.gz", "{clusters}.csv", "prog --fp_file 'my data.gz' --clusters 4 --out 4.csv")]
    #[case::space_in_output("in.gz", "run 1/{clusters}.csv", "prog --fp_file in.gz --clusters 4 --out 'run 1/4.csv'")]
    #[case::single_quote("it's.gz", "{clusters}", "prog --fp_file 'it'\\''s.gz' --clusters 4 --out 4")]
    #[case::empty_input("", "{clusters}", "prog --fp_file '' --clusters 4 --out 4")]
    fn display_quotes_words_a_shell_would_split(
        #[case] input: &str,
        #[case] template: &str,
        #[case] expected: &str,
    ) {
        let template = CommandTemplate::new("prog", input, template).expect("template is valid");
        assert_eq!(template.invocation(4).to_string(), expected);
    }

    #[rstest]
    fn to_command_carries_program_and_args() {
        let invocation = CommandTemplate::default().invocation(10);
        let command = invocation.to_command();
        assert_eq!(command.get_program(), OsStr::new(DEFAULT_PROGRAM));
        assert_eq!(command.get_args().count(), invocation.args().len());
    }
}
