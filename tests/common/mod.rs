#![allow(dead_code)]

use std::sync::Mutex;

use sketchsweep::executor::{CommandFailure, CommandRunner, Invocation};

type Responder = Box<dyn Fn(&Invocation) -> Result<String, CommandFailure> + Send + Sync>;

/// Stands in for the external program; records every invocation.
pub struct ScriptedRunner {
    calls: Mutex<Vec<Invocation>>,
    respond: Responder,
}

impl ScriptedRunner {
    pub fn new(
        respond: impl Fn(&Invocation) -> Result<String, CommandFailure> + Send + Sync + 'static,
    ) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    /// Builds succeed; measurements print a report derived from their args.
    pub fn healthy() -> Self {
        Self::new(|inv| {
            if is_build(inv) {
                return Ok(String::new());
            }
            let phi: f64 = inv.args[1].parse().unwrap();
            Ok(program_output(0.9, 1.0 - phi * 10.0, 4096, 0.75))
        })
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn measurement_calls(&self) -> Vec<Invocation> {
        self.calls().into_iter().filter(|c| !is_build(c)).collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<String, CommandFailure> {
        self.calls.lock().unwrap().push(invocation.clone());
        (self.respond)(invocation)
    }
}

pub fn is_build(inv: &Invocation) -> bool {
    inv.args.iter().any(|a| a.starts_with("COPT="))
}

pub fn failure(inv: &Invocation, status: i32) -> CommandFailure {
    CommandFailure {
        command: inv.to_string(),
        status: Some(status),
        stderr: "simulated failure".to_string(),
    }
}

/// Report in the layout the sketch benchmark prints.
pub fn program_output(precision: f64, recall: f64, sketch_size: u64, stream_time: f64) -> String {
    format!(
        "Sketch Type: Count Min Sketch\n\
         Time to generate 100000000 items: 1.20 secs\n\
         Time to count 100000000 items: 2.5 secs\n\
         Time to compute phi-heavy hitter items: 0.01 secs\n\
         Real K value: 12\n\
         Time to stream items into sketch: {stream_time} secs\n\
         Time to compute phi heavy hitters: 0.001 secs\n\
         True Positives: 11.000000\t False Positives: 1.000000\tFalse Negatives: 1.000000\n\
         Size of Sketch in Bytes: {sketch_size}\n\
         precision: {precision:.3}\n\
         recall: {recall:.3}\n"
    )
}
