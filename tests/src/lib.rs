//! End-to-end tests for the `resultsnap` workspace.

#[cfg(test)]
mod support;

#[cfg(test)]
mod pipeline;
