//! Dockerfile install fragment.

use std::fmt;

/// Opening lines of a non-empty fragment.
pub const FRAGMENT_HEADER: &str =
    "RUN apt-get update && \\\n    apt-get install -y --no-install-recommends \\\n";

/// Closing line of a non-empty fragment.
pub const FRAGMENT_FOOTER: &str = "&& rm -rf /var/lib/apt/lists/*\n";

/// Packages to install, rendered as a Dockerfile `RUN` instruction.
///
/// An empty fragment renders as the empty string, meaning nothing needs to
/// be installed.
///
/// # Example
///
/// ```
/// use aptprobe::probe::InstallFragment;
///
/// let mut fragment = InstallFragment::new();
/// assert_eq!(fragment.render(), "");
///
/// fragment.push("jq");
/// assert_eq!(
///     fragment.render(),
///     "RUN apt-get update && \\\n    apt-get install -y --no-install-recommends \\\njq \\\n&& rm -rf /var/lib/apt/lists/*\n"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallFragment {
    packages: Vec<String>,
}

impl InstallFragment {
    /// Create an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fragment listing `packages` in the given order.
    pub fn from_packages<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a package.
    pub fn push(&mut self, package: impl Into<String>) {
        self.packages.push(package.into());
    }

    /// Whether there is nothing to install.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Packages in install order.
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Render the fragment text.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for InstallFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.packages.is_empty() {
            return Ok(());
        }

        f.write_str(FRAGMENT_HEADER)?;
        for package in &self.packages {
            writeln!(f, "{} \\", package)?;
        }
        f.write_str(FRAGMENT_FOOTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fragment_renders_empty_string() {
        let fragment = InstallFragment::new();
        assert!(fragment.is_empty());
        assert_eq!(fragment.render(), "");
    }

    #[test]
    fn fragment_lists_packages_one_per_line() {
        let fragment = InstallFragment::from_packages(["curl", "jq"]);

        let expected = "\
RUN apt-get update && \\
    apt-get install -y --no-install-recommends \\
curl \\
jq \\
&& rm -rf /var/lib/apt/lists/*
";
        assert_eq!(fragment.render(), expected);
    }

    #[test]
    fn fragment_preserves_insertion_order() {
        let mut fragment = InstallFragment::new();
        fragment.push("zlib1g");
        fragment.push("ca-certificates");
        fragment.push("build-essential");

        assert_eq!(
            fragment.packages(),
            &["zlib1g", "ca-certificates", "build-essential"]
        );
        let text = fragment.render();
        let zlib = text.find("zlib1g").unwrap();
        let certs = text.find("ca-certificates").unwrap();
        assert!(zlib < certs);
    }

    #[test]
    fn fragment_keeps_caller_duplicates() {
        let fragment = InstallFragment::from_packages(["jq", "jq"]);
        assert_eq!(fragment.render().matches("jq \\\n").count(), 2);
    }

    #[test]
    fn fragment_starts_with_run_and_ends_with_cleanup() {
        let text = InstallFragment::from_packages(["git"]).render();
        assert!(text.starts_with("RUN apt-get update && \\\n"));
        assert!(text.ends_with("&& rm -rf /var/lib/apt/lists/*\n"));
    }
}
