//! Command-line arguments of the `langg` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use langg_core::config::{TreeLayout, TreeSettings};

#[derive(Parser, Debug)]
#[command(name = "langg", version, about = "Create your language")]
pub struct Cli {
    /// Log level, the LOG_LEVEL environment variable takes precedence
    #[arg(short, long, visible_alias = "log-level", default_value = "info")]
    pub log: String,

    #[command(flatten)]
    pub input: TreeInput,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the trees come from.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct TreeInput {
    /// Input dictionary files
    #[arg(short = 'i', long = "infile", visible_alias = "input-file", value_name = "FILE")]
    pub infiles: Vec<PathBuf>,

    /// Read tree data from a binary file
    #[arg(long, visible_alias = "proto-in", value_name = "FILE")]
    pub binary_in: Option<PathBuf>,

    /// Read tree data from a JSON file
    #[arg(long, visible_alias = "json-infile", value_name = "FILE")]
    pub json_in: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate trees from input
    #[command(visible_aliases = ["gen", "treegen"])]
    Generate(GenerateArgs),

    /// Use input to generate langg
    #[command(visible_aliases = ["trn", "langg"])]
    Translate(TranslateArgs),
}

#[derive(Args, Debug)]
// One flag per output and behaviour switch
#[allow(clippy::struct_excessive_bools)]
pub struct GenerateArgs {
    /// Print JSON to stdout
    #[arg(long)]
    pub json_out: bool,

    /// Write JSON to the given file
    #[arg(long, value_name = "FILE")]
    pub json_outfile: Option<PathBuf>,

    /// Print graphviz to stdout
    #[arg(long)]
    pub dot_out: bool,

    /// Write graphviz to the given file
    #[arg(long, value_name = "FILE")]
    pub dot_outfile: Option<PathBuf>,

    /// Write the binary encoding to the given file
    #[arg(long, visible_alias = "proto-outfile", value_name = "FILE")]
    pub binary_outfile: Option<PathBuf>,

    /// Generate a separate tree per dictionary file
    #[arg(long)]
    pub separate_trees: bool,

    /// Chars to consider in the dictionary files
    #[arg(long, visible_alias = "considered-chars")]
    pub chars: Option<String>,

    /// Only process words starting with these chars
    #[arg(long)]
    pub root_chars: Option<String>,

    /// Only add full words to the tree(s)
    #[arg(long, visible_alias = "full-words")]
    pub full: bool,

    /// Length of the prefixes reported by --stats
    #[arg(short, long, default_value_t = 3)]
    pub kmers: u32,

    /// Print tree statistics to stdout
    #[arg(short, long, visible_alias = "statistics")]
    pub stats: bool,
}

impl GenerateArgs {
    /// Tree construction settings selected by these flags.
    pub fn tree_settings(&self) -> TreeSettings {
        TreeSettings {
            full_words: self.full,
            layout: if self.separate_trees { TreeLayout::Separate } else { TreeLayout::Merged },
            ..TreeSettings::from_chars(self.chars.as_deref(), self.root_chars.as_deref())
        }
    }
}

#[derive(Args, Debug)]
pub struct TranslateArgs {
    #[command(flatten)]
    pub source: TextInput,

    /// Which tree in the input data to use
    #[arg(short, long, default_value_t = 0)]
    pub tree: usize,

    /// Seed to use in random number generation
    #[arg(long)]
    pub seed: Option<u32>,

    /// Write the translation to the given file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub txt_outfile: Option<PathBuf>,
}

/// Text to translate.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct TextInput {
    /// Read phrases to translate from stdin
    #[arg(long)]
    pub stdin: bool,

    /// String to translate
    #[arg(long, visible_alias = "text")]
    pub txt: Option<String>,

    /// File to read and translate, one word per line
    #[arg(long, visible_alias = "txt-infile", value_name = "FILE")]
    pub txt_in: Vec<PathBuf>,
}
