// src/dag/sorter.rs

//! Dispatch ordering.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::errors::{InitiatorError, Result};
use crate::task::Task;
use crate::types::TaskId;

/// Computes the order in which a batch is dispatched.
///
/// Implementations return a permutation of the indices of `tasks` in which
/// every task comes after all tasks whose id it depends on, and fail with
/// [`InitiatorError::DagCycle`] when no such order exists.
pub trait Sorter: Send {
    fn sort(&self, tasks: &[Arc<dyn Task>]) -> Result<Vec<usize>>;
}

/// Kahn's algorithm over a `petgraph` graph, always picking the ready task
/// that was registered first.
///
/// Tasks with no ordering constraint between them therefore keep their
/// registration order. Dependencies on ids that no task carries are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct StableTopoSorter;

impl Sorter for StableTopoSorter {
    fn sort(&self, tasks: &[Arc<dyn Task>]) -> Result<Vec<usize>> {
        // Node index == registration index. Edge direction: dep -> dependent.
        let mut graph: DiGraph<TaskId, ()> = DiGraph::with_capacity(tasks.len(), tasks.len());
        let mut by_id: HashMap<TaskId, Vec<NodeIndex>> = HashMap::new();

        for task in tasks {
            let idx = graph.add_node(task.id());
            by_id.entry(task.id()).or_default().push(idx);
        }

        for (i, task) in tasks.iter().enumerate() {
            let dependent = NodeIndex::new(i);
            for dep in task.depends_on() {
                for &prereq in by_id.get(&dep).map(Vec::as_slice).unwrap_or(&[]) {
                    graph.update_edge(prereq, dependent, ());
                }
            }
        }

        let mut in_degree: Vec<usize> = graph
            .node_indices()
            .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, deg)| **deg == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(tasks.len());
        while let Some(Reverse(i)) = ready.pop() {
            order.push(i);
            for next in graph.neighbors_directed(NodeIndex::new(i), Direction::Outgoing) {
                let deg = &mut in_degree[next.index()];
                *deg -= 1;
                if *deg == 0 {
                    ready.push(Reverse(next.index()));
                }
            }
        }

        if order.len() < tasks.len() {
            return Err(cycle_error(&graph));
        }

        Ok(order)
    }
}

fn cycle_error(graph: &DiGraph<TaskId, ()>) -> InitiatorError {
    let cycle = tarjan_scc(graph)
        .into_iter()
        .find(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]));

    match cycle {
        Some(mut scc) => {
            scc.sort();
            let names: Vec<&str> = scc.iter().map(|n| graph[*n].as_str()).collect();
            InitiatorError::DagCycle(format!(
                "cycle detected in task graph involving task '{}' ({})",
                names[0],
                names.join(" -> ")
            ))
        }
        None => InitiatorError::DagCycle("cycle detected in task graph".to_string()),
    }
}
