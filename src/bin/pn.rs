use std::io::{self, BufRead};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use log::debug;

use petri_stepper::config::PnConfig;
use petri_stepper::engine::{Change, LogObserver, ObserverList, Session};
use petri_stepper::net::{self, MarkingDescription, Net, NetDescription};
use petri_stepper::options::{Options, Step};

fn main() {
    if std::env::var("PN_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("PN_LOG")
            .write_style("PN_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let options = if args.is_empty() {
        Options::parse_from_str(&std::env::var("PN_FLAGS").unwrap_or_default())
    } else {
        Options::parse_from_args(&args)
    };
    let options = match options {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };
    debug!("PN options: {:?}", options);

    if let Err(err) = run(&options) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(options: &Options) -> Result<()> {
    let config = PnConfig::load_from_file(&options.config)?;
    let format = options.format.unwrap_or(config.format);

    let desc: NetDescription = net::io::read(&options.net, format)
        .with_context(|| format!("Failed to read net description: {:?}", options.net))?;
    let net = Arc::new(
        Net::from_description(&desc)
            .with_context(|| format!("Invalid net in {:?}", options.net))?,
    );

    let initial_desc: MarkingDescription = match &options.marking {
        Some(path) => net::io::read(path, format)
            .with_context(|| format!("Failed to read marking: {:?}", path))?,
        None => desc.state.clone().unwrap_or_default(),
    };
    let initial = net.marking(&initial_desc).context("Invalid initial marking")?;

    let mut observers = ObserverList::new();
    if config.log_transitions {
        observers.subscribe(LogObserver::new(Arc::clone(&net)));
    }
    {
        let net = Arc::clone(&net);
        observers.subscribe(move |change: &Change<'_>| {
            println!("{:?}: {}", change.cause, render_marking(&net, change));
        });
    }

    let mut session =
        Session::with_observers(Arc::clone(&net), initial.clone(), config.history_limit, observers)?;
    if config.show_enabled {
        print_enabled(&session);
    }

    match &options.script {
        Some(script) => {
            let steps = Step::parse_line(script).map_err(|err| anyhow!("{err}"))?;
            for step in steps {
                if !execute(&mut session, &config, &initial, step)? {
                    break;
                }
            }
        }
        None => {
            for line in io::stdin().lock().lines() {
                let line = line.context("Failed to read stdin")?;
                let steps = match Step::parse_line(&line) {
                    Ok(steps) => steps,
                    Err(err) => {
                        eprintln!("error: {err}");
                        continue;
                    }
                };
                let mut keep_going = true;
                for step in steps {
                    keep_going = execute(&mut session, &config, &initial, step)?;
                    if !keep_going {
                        break;
                    }
                }
                if !keep_going {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Runs one step. Returns false when the user asked to stop.
fn execute(
    session: &mut Session,
    config: &PnConfig,
    initial: &net::Marking,
    step: Step,
) -> Result<bool> {
    match step {
        Step::Fire(name) => match session.fire_by_name(&name).map(|_| ()) {
            Ok(()) if config.show_enabled => print_enabled(session),
            Ok(()) => {}
            Err(err) => eprintln!("error: {err}"),
        },
        Step::Undo => {
            if !session.undo() {
                println!("nothing to undo");
            }
        }
        Step::Redo => {
            if !session.redo() {
                println!("nothing to redo");
            }
        }
        Step::Sequence => println!("sequence: [{}]", session.sequence_names().join(", ")),
        Step::Marking => {
            let marking = session.net().describe_marking(session.current());
            println!("marking: {:?}", marking);
        }
        Step::Enabled => print_enabled(session),
        Step::Reset => session.reset(initial.clone())?,
        Step::Quit => return Ok(false),
    }
    Ok(true)
}

fn render_marking(net: &Net, change: &Change<'_>) -> String {
    let marking = net.describe_marking(change.marking);
    match change.transition {
        Some(t) => format!("{} -> {:?}", net.transition_name(t), marking),
        None => format!("{:?}", marking),
    }
}

fn print_enabled(session: &Session) {
    let names = session
        .enabled_transitions()
        .into_iter()
        .map(|t| session.net().transition_name(t))
        .collect::<Vec<_>>();
    println!("enabled: [{}]", names.join(", "));
}
