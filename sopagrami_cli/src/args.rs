use std::path::PathBuf;

use clap::Parser;
use clap::builder::BoolishValueParser;
use sopagrami_common::Params;

/// SoPaGraMi - frequent subgraph mining on a single labelled graph
#[derive(Parser, Debug)]
#[command(name = "sopagrami")]
#[command(author, version, about, long_about = None)]
#[command(allow_negative_numbers = true)]
pub struct Args {
    /// Graph in `.lg` format (`t`, `v id label`, `e u v label` records)
    pub graph: PathBuf,

    /// Minimum MNI support
    #[arg(default_value_t = 2)]
    pub tau: usize,

    /// Load the graph as directed and mine oriented patterns (0/1)
    #[arg(default_value = "0", value_parser = BoolishValueParser::new(), action = clap::ArgAction::Set)]
    pub directed: bool,

    /// Order seeds by size before scheduling (0/1)
    #[arg(default_value = "1", value_parser = BoolishValueParser::new(), action = clap::ArgAction::Set)]
    pub sorted: bool,

    /// Worker threads; 0 or negative uses every core
    #[arg(default_value_t = 4)]
    pub threads: i32,

    /// Count support exactly instead of stopping once tau is met
    #[arg(long, default_value = "true", value_parser = BoolishValueParser::new(), action = clap::ArgAction::Set)]
    pub full_support: bool,

    /// Print the result as JSON instead of one line per pattern
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl Args {
    /// Convert command-line arguments into engine parameters
    pub fn to_params(&self) -> Params {
        Params::default()
            .with_tau(self.tau)
            .with_directed(self.directed)
            .with_sorted_seeds(self.sorted)
            .with_threads(self.threads)
            .with_full_support(self.full_support)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_usage_line() {
        let args = Args::try_parse_from(["sopagrami", "g.lg"]).unwrap();
        let params = args.to_params();
        assert_eq!(params.tau, 2);
        assert!(!params.directed);
        assert!(params.sorted_seeds);
        assert_eq!(params.num_threads, 4);
        assert!(params.compute_full_support);
        assert!(!args.json);
    }

    #[test]
    fn positional_settings() {
        let args =
            Args::try_parse_from(["sopagrami", "g.lg", "5", "1", "0", "-1", "--full-support", "false"])
                .unwrap();
        let params = args.to_params();
        assert_eq!(params.tau, 5);
        assert!(params.directed);
        assert!(!params.sorted_seeds);
        assert_eq!(params.num_threads, -1);
        assert!(!params.compute_full_support);
    }

    #[test]
    fn missing_graph_is_an_error() {
        assert!(Args::try_parse_from(["sopagrami"]).is_err());
    }
}
