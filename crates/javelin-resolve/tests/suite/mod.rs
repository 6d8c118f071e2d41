mod bytecode;
mod caching;
mod config;
mod expressions;
mod generics;
mod overloads;
mod reflection;
mod support;
