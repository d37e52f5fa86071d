mod cli;

use clap::Parser;
use log::info;

use langg_core::config::{InputSource, OutputTarget, PersistFormat, TranslateSettings, TreeSettings};
use langg_core::decision::DEFAULT_SEED;
use langg_core::model::collection::TreeCollection;
use langg_core::translate::translator::Translator;

use crate::cli::{Cli, Command, GenerateArgs, TranslateArgs, TreeInput};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log);

    // Translating straight from dictionaries uses the default tree settings
    let settings = match &cli.command {
        Command::Generate(args) => args.tree_settings(),
        Command::Translate(_) => TreeSettings::default(),
    };
    let collection = load_collection(&cli.input, &settings)?;

    match cli.command {
        Command::Generate(args) => generate(&collection, &args),
        Command::Translate(args) => translate(&collection, args),
    }
}

fn init_logging(level: &str) {
    let filter = std::env::var("LOG_LEVEL").unwrap_or_else(|_| level.to_owned());
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(&filter);
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}

fn load_collection(input: &TreeInput, settings: &TreeSettings) -> langg_core::Result<TreeCollection> {
    if let Some(path) = &input.binary_in {
        return TreeCollection::load(path, PersistFormat::Binary);
    }
    if let Some(path) = &input.json_in {
        return TreeCollection::load(path, PersistFormat::Json);
    }
    TreeCollection::from_sources(&input.infiles, settings)
}

fn generate(collection: &TreeCollection, args: &GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.json_out {
        println!("{}", collection.to_json(false)?);
    }

    if let Some(path) = &args.json_outfile {
        collection.save(path, PersistFormat::Json)?;
        info!("JSON written to {}", path.display());
    }

    if args.dot_out {
        println!("{}", collection.to_dot());
    }

    if let Some(path) = &args.dot_outfile {
        collection.write_dot(path)?;
        info!("Graphviz written to {}", path.display());
    }

    if let Some(path) = &args.binary_outfile {
        collection.save(path, PersistFormat::Binary)?;
        info!("Binary written to {}", path.display());
    }

    if args.stats {
        println!("{}", serde_json::to_string_pretty(&collection.statistics(args.kmers))?);
    }

    Ok(())
}

fn translate(collection: &TreeCollection, args: TranslateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = TranslateSettings {
        seed: args.seed.unwrap_or(DEFAULT_SEED),
        tree_index: args.tree,
        ..TranslateSettings::default()
    };
    let translator = Translator::new(collection, &settings)?;

    let source = InputSource::select(args.source.txt, args.source.txt_in, args.source.stdin)?;
    let target = args.txt_outfile.map_or(OutputTarget::Stdout, OutputTarget::File);

    let lines = source
        .read_lines()?
        .iter()
        .map(|line| translator.translate_line(line))
        .collect::<langg_core::Result<Vec<_>>>()?;

    target.write(&lines.join("\n"))?;
    Ok(())
}
