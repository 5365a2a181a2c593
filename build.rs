// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("mvnmap")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Mvnmap Contributors")
        .about("Map Java build artifacts onto a system installation layout")
        .subcommand_required(true)
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("install")
                .about("Install artifacts into a root directory")
                .arg(
                    Arg::new("root")
                        .short('r')
                        .long("root")
                        .value_name("DIR")
                        .required(true)
                        .help("Installation root"),
                )
                .arg(
                    Arg::new("package")
                        .short('p')
                        .long("package")
                        .value_name("NAME")
                        .required(true)
                        .help("Base package name"),
                )
                .arg(
                    Arg::new("manifest_dir")
                        .short('m')
                        .long("manifest-dir")
                        .value_name("DIR")
                        .help("Directory receiving .mfiles manifests"),
                )
                .arg(
                    Arg::new("check_unmatched")
                        .long("check-unmatched")
                        .action(ArgAction::SetTrue)
                        .help("Fail if a mandatory packaging rule matched no artifact"),
                )
                .arg(
                    Arg::new("artifacts")
                        .required(true)
                        .num_args(1..)
                        .value_name("COORDINATES=FILE")
                        .help("Artifacts to install"),
                ),
        )
        .subcommand(Command::new("config").about("Print the effective configuration as JSON"))
        .subcommand(
            Command::new("translate")
                .about("Translate an artifact through the system dependency map")
                .arg(Arg::new("coordinates").required(true).help("Artifact coordinates"))
                .arg(
                    Arg::new("namespace")
                        .short('n')
                        .long("namespace")
                        .help("Only follow mappings of this namespace"),
                ),
        )
        .subcommand(
            Command::new("locate")
                .about("Print where a repository would place an artifact")
                .arg(Arg::new("coordinates").required(true).help("Artifact coordinates"))
                .arg(
                    Arg::new("repository")
                        .short('r')
                        .long("repository")
                        .default_value("install")
                        .help("Repository ID"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer).expect("Failed to render man page");

    let man_path = man_dir.join("mvnmap.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");
}
