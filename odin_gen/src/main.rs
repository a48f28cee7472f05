use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use odin_gen::cmds;
use odin_gen::codegen::{GeneratorTarget, DEFAULT_NAME};

#[derive(Parser)]
#[command(name = "odin-gen")]
#[command(about = "Object dictionary code generation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Generate code and documents from an object dictionary specification */
    Generate {
        /* Input YAML specification */
        input_file: PathBuf,

        /* Directory the artifacts are written into; must exist */
        output_dir: PathBuf,

        /* Base name of the output files */
        #[arg(long = "name", default_value = DEFAULT_NAME)]
        name: String,

        /* Targets to generate; all of them when omitted */
        #[arg(long = "target", value_enum)]
        target: Vec<Target>,
    },

    /* Write the JSON schema of the specification document */
    GenSchema {
        /* Output path of the schema file */
        output_file: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum Target {
    /* Generate the C runtime (.h and .c files) */
    C,
    /* Generate the host-side client (.py file) */
    Py,
    /* Generate the object dictionary database (.odin file) */
    Db,
    /* Generate the reference document (.md file) */
    Doc,
}

impl From<Target> for GeneratorTarget {
    fn from(target: Target) -> Self {
        match target {
            Target::C => GeneratorTarget::C,
            Target::Py => GeneratorTarget::Py,
            Target::Db => GeneratorTarget::Db,
            Target::Doc => GeneratorTarget::Doc,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input_file,
            output_dir,
            name,
            target,
        } => {
            let targets = target.into_iter().map(GeneratorTarget::from).collect();
            cmds::generate::run(&input_file, &output_dir, &name, targets)?;
        }

        Commands::GenSchema { output_file } => {
            cmds::schema::run(&output_file)?;
        }
    }

    Ok(())
}
