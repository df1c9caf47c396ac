use clap::{Arg, ArgAction, Command};

pub fn cli() -> Command {
    Command::new("bankrpc")
        .about("Datagram-based banking RPC server")
        .author("bankrpc contributors")
        .arg(
            Arg::new("bind-addr")
                .long("bind-addr")
                .default_value("0.0.0.0")
                .value_name("ADDRESS")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .default_value("8080")
                .value_name("PORT")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .default_value("at-most-once")
                .value_parser(["at-least-once", "at-most-once", "maybe"])
                .value_name("MODE")
                .help("initial invocation-semantics mode")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("loss-threshold")
                .long("loss-threshold")
                .default_value("0")
                .value_name("0..100")
                .help("initial packet-loss simulator threshold")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .default_value("info")
                .value_name("LOG_LEVEL")
                .action(ArgAction::Set),
        )
}
