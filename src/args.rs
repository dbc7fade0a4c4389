use clap::Parser;

/// Fills in a Swiss list ballot (panachage, cumulation) from a command script and
/// counts the votes it gives to the candidates and the parties.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The parties and their candidates, in JSON or in CSV (for files
    /// ending with .csv). If not provided, the four parties of the national council example
    /// are used.
    #[clap(short, long, value_parser)]
    pub parties: Option<String>,

    /// (file path or empty) The command script to play. If not provided, the commands are read
    /// from the standard input.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the final ballot will be
    /// written in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, the printable ballot with its seat table is written
    /// as an HTML document to the given location.
    #[clap(long, value_parser)]
    pub print: Option<String>,

    /// (file path) A reference file containing the expected summary in JSON format. If provided,
    /// listenwahl will check that the summary of the final ballot matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default 4, at least 1) The number of seats, which is also the number of lines of the
    /// ballot. The tutorial exercises are fitted to it.
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_seats: Option<u32>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
