use clap::{Parser, Subcommand};
use itertools::Itertools;
use log::{error, info};
use poremodel::prelude::*;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(author, about, version)]
struct Opts {
    /// Verbosity of logs (-v: info, -vv: debug, -vvv: trace)
    #[clap(short, long, parse(from_occurrences), global = true)]
    verbose: usize,
    /// Symbols of the alphabet in rank order
    #[clap(long, default_value = "ACGT", global = true)]
    symbols: String,
    /// Prefix stripped from the model path recorded in a container
    #[clap(long, default_value = "/opt/chimaera/model/", global = true)]
    model_path_prefix: String,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a text model and write it back in rank order
    Convert {
        /// Input text model (.gz is decompressed)
        input: PathBuf,
        /// Output text model (.gz is compressed)
        #[clap(short, long)]
        output: PathBuf,
        /// Model name written in the header
        #[clap(short, long)]
        name: Option<String>,
    },
    /// Write the model of each container as `<outdir>/<model name>.model`,
    /// once per model name
    Extract {
        /// Container JSON files
        #[clap(required = true)]
        containers: Vec<PathBuf>,
        /// Output directory
        #[clap(short = 'd', long)]
        outdir: PathBuf,
        /// Strand of the read
        #[clap(short, long, default_value = "template")]
        strand: Strand,
    },
    /// Print the baked states of the container model as TSV
    Bake {
        /// Container JSON file
        container: PathBuf,
        /// Strand of the read
        #[clap(short, long, default_value = "template")]
        strand: Strand,
    },
}

fn init_logger(verbose: usize) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn convert(config: &ModelConfig, input: &Path, output: &Path, name: Option<&str>) -> Result<()> {
    let alphabet = config.alphabet()?;
    let model = PoreModel::from_model_file(input, &alphabet)?;
    model.to_model_file(output, name)?;
    info!("wrote {} to {}", model, output.display());
    Ok(())
}

fn load_one(config: &ModelConfig, container: &Path, strand: Strand) -> Result<PoreModel> {
    let c = MemoryContainer::from_json_file(container)?;
    PoreModel::from_container(&c, strand, config)
}

fn write_one(model: &PoreModel, outdir: &Path) -> Result<PathBuf> {
    let path = outdir.join(format!("{}.model", model.name()));
    model.to_model_file(&path, None)?;
    Ok(path)
}

fn extract(config: &ModelConfig, containers: &[PathBuf], outdir: &Path, strand: Strand) -> usize {
    let loaded: Vec<(&PathBuf, Result<PoreModel>)> = containers
        .par_iter()
        .map(|container| (container, load_one(config, container, strand)))
        .collect();
    let mut n_failed = 0;
    let mut models = Vec::with_capacity(loaded.len());
    for (container, result) in loaded {
        match result {
            Ok(model) => models.push((container, model)),
            Err(e) => {
                error!("skipped {}: {}", container.display(), e);
                n_failed += 1;
            }
        }
    }

    let unique = unique_by_name(models);
    for container in unique.duplicates.iter() {
        info!("{} has an already extracted model", container.display());
    }
    for (container, e) in unique.conflicts.iter() {
        error!("skipped {}: {}", container.display(), e);
        n_failed += 1;
    }

    // names are distinct, so no two workers write the same file
    let written: Vec<(&PathBuf, Result<PathBuf>)> = unique
        .models
        .par_iter()
        .map(|(container, model)| (*container, write_one(model, outdir)))
        .collect();
    for (container, result) in written {
        match result {
            Ok(path) => info!("{} -> {}", container.display(), path.display()),
            Err(e) => {
                error!("skipped {}: {}", container.display(), e);
                n_failed += 1;
            }
        }
    }
    n_failed
}

fn bake(config: &ModelConfig, container: &Path, strand: Strand) -> Result<()> {
    let c = MemoryContainer::from_json_file(container)?;
    let model = PoreModel::from_container(&c, strand, config)?;
    println!("# model={}", model.name());
    println!("# calibration={}", model.calibration());
    println!(
        "{}",
        [
            "kmer",
            "level_mean",
            "level_stdv",
            "level_log_stdv",
            "sd_mean",
            "sd_stdv",
            "sd_lambda",
            "sd_log_lambda"
        ]
        .iter()
        .join("\t")
    );
    for rank in 0..model.n_states() {
        println!(
            "{}\t{}",
            String::from_utf8_lossy(&model.kmer(rank)),
            model.emission(rank)
        );
    }
    Ok(())
}

fn main() {
    let opts: Opts = Opts::parse();
    init_logger(opts.verbose);
    eprintln!("# started_at={}", chrono::Local::now());
    eprintln!("# opts={:?}", opts);
    let config = ModelConfig::new(&opts.symbols, &opts.model_path_prefix);

    let result = match &opts.command {
        Commands::Convert {
            input,
            output,
            name,
        } => convert(&config, input, output, name.as_deref()),
        Commands::Extract {
            containers,
            outdir,
            strand,
        } => {
            let n_failed = extract(&config, containers, outdir, *strand);
            if n_failed > 0 {
                Err(ModelError::Container(format!(
                    "{} of {} containers failed",
                    n_failed,
                    containers.len()
                )))
            } else {
                Ok(())
            }
        }
        Commands::Bake { container, strand } => bake(&config, container, *strand),
    };

    eprintln!("# finished_at={}", chrono::Local::now());
    if let Err(e) = result {
        error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
