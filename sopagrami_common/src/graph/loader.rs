//! `.lg` text loader.
//!
//! ```text
//! t # 0 undirected
//! v 0 A
//! v 1 B
//! e 0 1 x
//! ```

use std::path::Path;

use itertools::Itertools;
use tracing::info;

use super::{DataGraph, GraphBuilder, VertexId};
use crate::error::{Error, Result};

/// An `e` record, checked once every vertex is known.
struct PendingEdge<'a> {
    line: usize,
    u: VertexId,
    v: VertexId,
    label: &'a str,
}

fn parse_id(token: &str, line: usize) -> Result<VertexId> {
    token
        .parse::<VertexId>()
        .map_err(|_| Error::format(line, format!("invalid vertex id {token:?}")))
}

fn expect_tokens(tokens: &[&str], expected: usize, line: usize) -> Result<()> {
    if tokens.len() != expected {
        return Err(Error::format(
            line,
            format!(
                "'{}' record needs {} tokens, found {}",
                tokens[0],
                expected,
                tokens.len()
            ),
        ));
    }
    Ok(())
}

fn check_header(tokens: &[&str], directed: bool, line: usize) -> Result<()> {
    match tokens {
        ["t"] | ["t", "#", _] => Ok(()),
        ["t", "#", _, word] => {
            let declared = match *word {
                "directed" => true,
                "undirected" => false,
                other => {
                    return Err(Error::format(
                        line,
                        format!("unknown direction {other:?} in graph header"),
                    ));
                }
            };
            if declared != directed {
                return Err(Error::format(
                    line,
                    format!(
                        "graph declared {word} but was loaded as {}",
                        if directed { "directed" } else { "undirected" }
                    ),
                ));
            }
            Ok(())
        }
        _ => Err(Error::format(line, "malformed graph header")),
    }
}

impl DataGraph {
    /// Read and parse an `.lg` file.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] when the file cannot be read, [`Error::Format`] when its
    /// contents are malformed.
    pub fn load_from_lg(path: impl AsRef<Path>, directed: bool) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading graph from {:?} (directed={})", path, directed);
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse_lg(&text, directed)
    }

    /// Parse `.lg` text.
    ///
    /// # Errors
    ///
    /// [`Error::Format`] on a wrong token count, an unparseable or duplicate
    /// vertex id, a gap in the vertex id range, an edge to an undeclared
    /// vertex, a second graph header, or a header whose direction disagrees
    /// with `directed`.
    pub fn parse_lg(text: &str, directed: bool) -> Result<Self> {
        let mut seen_header = false;
        let mut vertices: Vec<(VertexId, &str, usize)> = Vec::new();
        let mut edges: Vec<PendingEdge<'_>> = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let tokens: Vec<&str> = raw.split_whitespace().collect();
            let Some(&kind) = tokens.first() else {
                continue;
            };
            match kind {
                k if k.starts_with('#') => {}
                "t" => {
                    if seen_header {
                        return Err(Error::format(
                            line,
                            "multiple graphs in one file are not supported",
                        ));
                    }
                    check_header(&tokens, directed, line)?;
                    seen_header = true;
                }
                "v" => {
                    expect_tokens(&tokens, 3, line)?;
                    vertices.push((parse_id(tokens[1], line)?, tokens[2], line));
                }
                "e" => {
                    expect_tokens(&tokens, 4, line)?;
                    edges.push(PendingEdge {
                        line,
                        u: parse_id(tokens[1], line)?,
                        v: parse_id(tokens[2], line)?,
                        label: tokens[3],
                    });
                }
                other => {
                    return Err(Error::format(
                        line,
                        format!("unknown record type {other:?}"),
                    ));
                }
            }
        }

        let mut builder = GraphBuilder::new(directed);
        for (expected, (id, label, line)) in vertices
            .into_iter()
            .sorted_by_key(|(id, _, _)| *id)
            .enumerate()
        {
            match (id as usize).cmp(&expected) {
                std::cmp::Ordering::Equal => {
                    builder.add_vertex(label);
                }
                std::cmp::Ordering::Less => {
                    return Err(Error::format(line, format!("duplicate vertex id {id}")));
                }
                std::cmp::Ordering::Greater => {
                    return Err(Error::format(
                        line,
                        format!("vertex ids must be dense, {expected} is missing"),
                    ));
                }
            }
        }

        let n = builder.num_vertices();
        for edge in edges {
            if edge.u as usize >= n || edge.v as usize >= n {
                return Err(Error::format(
                    edge.line,
                    format!(
                        "edge {} -> {} references an undeclared vertex (|V| = {n})",
                        edge.u, edge.v
                    ),
                ));
            }
            builder
                .add_edge(edge.u, edge.v, edge.label)
                .map_err(|e| match e {
                    Error::Format { reason, .. } => Error::format(edge.line, reason),
                    other => other,
                })?;
        }

        let graph = builder.build();
        info!(
            "Graph loaded: |V|={}, |E|={}",
            graph.num_vertices(),
            graph.num_edges()
        );
        Ok(graph)
    }
}
