// beans shared by the mapping tests
use indexmap::{IndexMap, IndexSet};

use crate::core::data::Bean;
use crate::core::property::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Executor {
    User,
    Console,
}
crate::mappable_enum!(Executor { User, Console });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Adventure,
}
crate::mappable_enum!(GameMode { Survival, Creative, Adventure });

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Command {
    pub command: Option<String>,
    pub arguments: Vec<String>,
    pub execution: Option<Executor>,
}

impl Bean for Command {
    fn properties() -> Vec<Field<Self>> {
        vec![
            Field::required("command", |c| &c.command, |c| &mut c.command),
            Field::new("arguments", |c| &c.arguments, |c| &mut c.arguments),
            Field::required("execution", |c| &c.execution, |c| &mut c.execution),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandConfig {
    pub commands: IndexMap<String, Command>,
    pub duration: i32,
}

impl Bean for CommandConfig {
    fn properties() -> Vec<Field<Self>> {
        vec![
            Field::new("commands", |c| &c.commands, |c| &mut c.commands),
            Field::new("duration", |c| &c.duration, |c| &mut c.duration),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComplexCommand {
    pub command: Option<String>,
    pub name_has_length: Option<i32>,
    pub executor: Option<Executor>,
}

impl Bean for ComplexCommand {
    fn properties() -> Vec<Field<Self>> {
        vec![
            Field::required("command", |c| &c.command, |c| &mut c.command),
            Field::new("name_has_length", |c| &c.name_has_length, |c| &mut c.name_has_length),
            Field::new("executor", |c| &c.executor, |c| &mut c.executor),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub worlds: IndexSet<String>,
    pub default_mode: GameMode,
}

impl Bean for Group {
    fn properties() -> Vec<Field<Self>> {
        vec![
            Field::new("worlds", |g| &g.worlds, |g| &mut g.worlds),
            Field::new("default_mode", |g| &g.default_mode, |g| &mut g.default_mode),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorldGroupConfig {
    pub groups: IndexMap<String, Group>,
}

impl Bean for WorldGroupConfig {
    fn properties() -> Vec<Field<Self>> {
        vec![Field::new("groups", |w| &w.groups, |w| &mut w.groups)]
    }
}

crate::mappable_bean!(Command, CommandConfig, ComplexCommand, Group, WorldGroupConfig);
