/*
[INPUT]:  Parsed subcommands and loaded configuration
[OUTPUT]: One-shot command implementations and the config generator
[POS]:    CLI module for the task-reward binary
[UPDATE]: When adding subcommands
*/

pub mod commands;
pub mod init;
