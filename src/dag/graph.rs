// src/dag/graph.rs

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::errors::Result;

/// One node of the submission DAG.
///
/// Nodes are created while the submission artifacts are generated, consumed
/// by the external scheduler, and never mutated afterward.
#[derive(Debug, Clone)]
pub struct DagNode {
    /// Node name as it appears in the DAG file (e.g. `batch3`, `collect`).
    pub name: String,
    /// Submit description file for this node. Written as given; the builder
    /// emits every artifact into one directory and references basenames so
    /// the set stays relocatable.
    pub submit_file: PathBuf,
}

/// In-memory dependency graph of submission nodes.
///
/// Edge direction is parent -> child: the child may only start once the
/// parent completed. Batch nodes have no edges among themselves.
#[derive(Debug, Clone, Default)]
pub struct JobDag {
    nodes: Vec<DagNode>,
    edges: Vec<(usize, usize)>,
}

impl JobDag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its index.
    pub fn add_node(&mut self, name: impl Into<String>, submit_file: impl Into<PathBuf>) -> usize {
        let node = DagNode {
            name: name.into(),
            submit_file: submit_file.into(),
        };
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Add a parent -> child dependency edge between two existing nodes.
    pub fn add_edge(&mut self, parent: usize, child: usize) {
        debug_assert!(parent < self.nodes.len() && child < self.nodes.len());
        self.edges.push((parent, child));
    }

    pub fn nodes(&self) -> &[DagNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Check structural soundness before anything is written to disk:
    /// unique node names and no cycles.
    pub fn validate(&self) -> Result<()> {
        for (idx, node) in self.nodes.iter().enumerate() {
            if self.nodes[..idx].iter().any(|n| n.name == node.name) {
                return Err(anyhow!("duplicate DAG node name '{}'", node.name).into());
            }
        }

        let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
        for idx in 0..self.nodes.len() {
            graph.add_node(idx);
        }
        for &(parent, child) in &self.edges {
            graph.add_edge(parent, child, ());
        }

        // A topological sort fails iff there is a cycle.
        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => {
                let name = &self.nodes[cycle.node_id()].name;
                Err(anyhow!("cycle detected in submission DAG involving node '{}'", name).into())
            }
        }
    }

    /// Write the DAG description file: one `JOB` line per node in insertion
    /// order, then one `PARENT .. CHILD ..` line per edge.
    pub fn write_dag_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let file =
            File::create(path).with_context(|| format!("creating DAG file {:?}", path))?;
        let mut writer = BufWriter::new(file);

        for node in &self.nodes {
            writeln!(writer, "JOB {} {}", node.name, node.submit_file.display())?;
        }
        for &(parent, child) in &self.edges {
            writeln!(
                writer,
                "PARENT {} CHILD {}",
                self.nodes[parent].name, self.nodes[child].name
            )?;
        }
        writer.flush()?;

        debug!(
            path = ?path,
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "wrote DAG description file"
        );
        Ok(())
    }
}
