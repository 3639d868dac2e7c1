mod analyze;
mod report;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "jarscope",
    version,
    about = "Inventory jar/war/ear archives and analyze their cross-archive dependencies",
    long_about = "Jarscope scans packaged Java archives, determines what each one provides \
                  and requires, and computes direct, transitive and circular dependency \
                  relationships between them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan archives and print a dependency report
    Analyze {
        /// Archive files or directories to scan
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Blacklist prefix (dotted; `.*` means subtree). Repeatable.
        #[arg(long = "blacklist", value_name = "PREFIX")]
        blacklist: Vec<String>,

        /// Known platform profiles to apply. Repeatable.
        #[arg(long = "profile", value_enum, default_value = "java-se")]
        profiles: Vec<ProfileKind>,

        /// Classloader visibility strategy
        #[arg(long = "visibility", value_enum, default_value = "permissive")]
        visibility: VisibilityKind,

        /// Shared library roots for the directory-scoped visibility
        #[arg(long = "shared-root", value_name = "DIR")]
        shared_roots: Vec<PathBuf>,

        /// Output format
        #[arg(long = "format", value_enum, default_value = "text")]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfileKind {
    /// Prefix table for the Java SE packages
    JavaSe,
    /// Prefix table for the Java EE / Jakarta EE APIs
    JavaEe,
    /// Exact class list read from a locally installed JDK
    Jdk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VisibilityKind {
    /// Flat classpath: every archive sees every other
    Permissive,
    /// App-server style directory isolation
    DirectoryScoped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

/// Returns the process exit code: 0 when the graph is clean, 1 on a
/// hard error, 2 when circular dependencies were found. The "red
/// status" policy lives entirely here; the core only produces data.
pub fn run() -> Result<i32, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = jarscope_core::logging::init_logging("cli", true);

    match cli.command {
        Commands::Analyze {
            paths,
            blacklist,
            profiles,
            visibility,
            shared_roots,
            format,
        } => analyze::run(paths, blacklist, profiles, visibility, shared_roots, format),
    }
}
