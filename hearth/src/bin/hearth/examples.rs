use crate::commands::{inspect, seed, serve};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "serve",
            groups: serve::EXAMPLES,
        },
        CommandExample {
            name: "inspect",
            groups: inspect::EXAMPLES,
        },
        CommandExample {
            name: "seed",
            groups: seed::EXAMPLES,
        },
    ]
}
