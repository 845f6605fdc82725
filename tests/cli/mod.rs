mod argument_parsing;
mod binary;
mod toml_config;
