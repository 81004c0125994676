// SPDX-FileCopyrightText: The cluster-poll authors
//
// SPDX-License-Identifier: MIT

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::command::{CommandOutput, CommandRunner, Invocation};

#[derive(Clone)]
enum Scripted {
    Output(CommandOutput),
    SpawnError,
}

/// Replays canned results in order. The last one repeats forever.
#[derive(Default)]
pub struct ScriptedRunner {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_ok(&self, stdout: &str) {
        self.push(Scripted::Output(CommandOutput {
            status: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }));
    }

    pub fn push_err(&self, status: i32, stderr: &str) {
        self.push(Scripted::Output(CommandOutput {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }));
    }

    pub fn push_output(&self, status: i32, stdout: &str, stderr: &str) {
        self.push(Scripted::Output(CommandOutput {
            status: Some(status),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }));
    }

    pub fn push_spawn_error(&self) {
        self.push(Scripted::SpawnError);
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, entry: Scripted) {
        self.script.lock().unwrap().push_back(entry);
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        let mut script = self.script.lock().unwrap();
        let entry = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        match entry {
            Some(Scripted::Output(output)) => Ok(output),
            Some(Scripted::SpawnError) => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such file or directory",
            )),
            None => panic!("unexpected command: {invocation}"),
        }
    }
}
