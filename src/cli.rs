use clap::{command, Arg, ArgAction, Command, ValueHint};

pub fn build_command() -> Command {
    command!().args([
        Arg::new("api_key")
            .short('k')
            .long("api-key")
            .alias("key")
            .required(false)
            .value_hint(ValueHint::FilePath)
            .value_name("PATH")
            .help("Path to a file containing a Steam API key."),
        Arg::new("config")
            .short('c')
            .long("config-file")
            .alias("config")
            .required(false)
            .value_hint(ValueHint::FilePath)
            .value_name("PATH")
            .help("Path to the YAML config file."),
        Arg::new("user")
            .short('u')
            .long("user")
            .required(false)
            .value_name("USER")
            .help("SteamID64 or vanity name whose library is ranked."),
        Arg::new("output")
            .short('o')
            .long("output")
            .required(false)
            .value_hint(ValueHint::FilePath)
            .value_name("PATH")
            .help("Where to write the ranked CSV report."),
        Arg::new("overrides")
            .long("overrides")
            .required(false)
            .value_hint(ValueHint::FilePath)
            .value_name("PATH")
            .help("CSV of Steam title to IGDB title corrections."),
        Arg::new("supplemental")
            .long("supplemental")
            .required(false)
            .value_hint(ValueHint::FilePath)
            .value_name("PATH")
            .help("CSV of non-Steam games as name,IGDB ID."),
        Arg::new("with_reviews")
            .long("with-reviews")
            .action(ArgAction::SetTrue)
            .help("Add a SteamSpy review score column."),
        Arg::new("log_level")
            .long("log-level")
            .required(false)
            .value_name("LEVEL")
            .value_parser(["off", "error", "warn", "info", "debug", "trace"])
            .help("Console log level [default: warn]."),
        Arg::new("quiet")
            .short('q')
            .long("quiet")
            .action(ArgAction::SetTrue)
            .help("Don't print the ranked list to the console."),
    ])
}
