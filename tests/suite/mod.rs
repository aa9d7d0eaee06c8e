mod binary;
mod config;
mod report;
