//! Dependency graph for step execution ordering.
//!
//! A step's effective dependencies are its explicit `dependsOn` entries plus
//! the source step of every output reference in its parameters. Sorting and
//! cycle detection both work from this one edge set, so they never disagree.

use std::collections::{HashMap, VecDeque};

use crate::error::{PlanwrightError, Result};
use crate::plan::{ExecutionPlan, PlanStep};
use crate::planner::reference::referenced_steps;

/// Effective dependencies of a step, deduplicated, explicit ones first.
pub fn effective_dependencies(step: &PlanStep) -> Vec<String> {
    let mut deps: Vec<String> = Vec::new();
    let implicit = referenced_steps(&step.params);
    for dep in step.depends_on.iter().chain(implicit.iter()) {
        if !deps.contains(dep) {
            deps.push(dep.clone());
        }
    }
    deps
}

/// Render a cycle path as `a → b → a`.
pub fn format_cycle(path: &[String]) -> String {
    path.join(" → ")
}

/// Represents the dependency relationships between steps.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Step IDs in declaration order.
    order: Vec<String>,
    /// Map of step ID to its direct dependencies.
    dependencies: HashMap<String, Vec<String>>,
    /// Map of step ID to steps that depend on it.
    dependents: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Create a new dependency graph builder.
    pub fn builder() -> DependencyGraphBuilder {
        DependencyGraphBuilder::new()
    }

    /// Build the graph of a plan from its effective dependencies.
    ///
    /// A repeated step ID keeps its first declaration.
    pub fn from_plan(plan: &ExecutionPlan) -> Self {
        plan.steps
            .iter()
            .fold(Self::builder(), |builder, step| {
                builder.add_step(step.id.clone(), effective_dependencies(step))
            })
            .build()
    }

    /// Get the direct dependencies of a step.
    pub fn dependencies_of(&self, step: &str) -> Option<&[String]> {
        self.dependencies.get(step).map(Vec::as_slice)
    }

    /// Get steps that depend on the given step.
    pub fn dependents_of(&self, step: &str) -> Option<&[String]> {
        self.dependents.get(step).map(Vec::as_slice)
    }

    /// Check if a step exists in the graph.
    pub fn contains(&self, step: &str) -> bool {
        self.dependencies.contains_key(step)
    }

    /// Get all step IDs in declaration order.
    pub fn steps(&self) -> &[String] {
        &self.order
    }

    /// Get the number of steps in the graph.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns steps in topological order (dependencies before dependents).
    ///
    /// Independent steps keep their declaration order, so the result is
    /// deterministic for a given plan.
    ///
    /// Returns an error if a dependency is unknown or a cycle is detected.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        for step in &self.order {
            for dep in &self.dependencies[step] {
                if !self.contains(dep) {
                    return Err(PlanwrightError::UnknownDependency {
                        step: step.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        // Count incoming edges for each node
        let mut in_degree: HashMap<&str, usize> = self
            .order
            .iter()
            .map(|s| (s.as_str(), self.dependencies[s].len()))
            .collect();

        // Start with nodes that have no dependencies
        let mut queue: VecDeque<&str> = self
            .order
            .iter()
            .map(String::as_str)
            .filter(|s| in_degree[s] == 0)
            .collect();

        let mut result = Vec::with_capacity(self.order.len());

        while let Some(step) = queue.pop_front() {
            result.push(step.to_string());

            // Reduce in-degree for all dependents
            if let Some(dependents) = self.dependents.get(step) {
                for dependent in dependents {
                    if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push_back(dependent);
                        }
                    }
                }
            }
        }

        // If we haven't processed all nodes, there's a cycle
        if result.len() != self.order.len() {
            let cycle = match self.find_cycle() {
                Some(path) => format_cycle(&path),
                None => self
                    .order
                    .iter()
                    .filter(|s| in_degree[s.as_str()] > 0)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            };

            return Err(PlanwrightError::CircularDependency { cycle });
        }

        Ok(result)
    }

    /// Find a cycle in the graph, returning the path if one exists.
    ///
    /// The path starts and ends on the same step, following dependency
    /// edges: `["a", "b", "c", "a"]` means a depends on b, b on c, c on a.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            Visiting,
            Visited,
        }

        let mut state: HashMap<&str, State> = self
            .order
            .iter()
            .map(|s| (s.as_str(), State::Unvisited))
            .collect();

        let mut parent: HashMap<&str, &str> = HashMap::new();

        fn dfs<'a>(
            node: &'a str,
            graph: &'a DependencyGraph,
            state: &mut HashMap<&'a str, State>,
            parent: &mut HashMap<&'a str, &'a str>,
        ) -> Option<Vec<String>> {
            state.insert(node, State::Visiting);

            if let Some(deps) = graph.dependencies.get(node) {
                for dep in deps {
                    match state.get(dep.as_str()) {
                        Some(State::Visiting) => {
                            // Walk parents back to where the cycle was entered
                            let mut path = vec![node.to_string()];
                            let mut current = node;
                            while current != dep.as_str() {
                                match parent.get(current) {
                                    Some(&p) => {
                                        current = p;
                                        path.push(p.to_string());
                                    }
                                    None => break,
                                }
                            }
                            path.reverse();
                            path.push(dep.clone());
                            return Some(path);
                        }
                        Some(State::Unvisited) => {
                            parent.insert(dep.as_str(), node);
                            if let Some(cycle) = dfs(dep, graph, state, parent) {
                                return Some(cycle);
                            }
                        }
                        // Finished, or not part of the graph
                        Some(State::Visited) | None => {}
                    }
                }
            }

            state.insert(node, State::Visited);
            None
        }

        for step in &self.order {
            if state.get(step.as_str()) == Some(&State::Unvisited) {
                if let Some(cycle) = dfs(step, self, &mut state, &mut parent) {
                    return Some(cycle);
                }
            }
        }

        None
    }

    /// Returns groups of steps that have no dependency relation between
    /// them.
    ///
    /// Each group contains steps whose dependencies are satisfied
    /// by all previous groups.
    pub fn parallel_groups(&self) -> Result<Vec<Vec<String>>> {
        // Surfaces unknown dependencies and cycles
        self.topological_order()?;

        let mut groups: Vec<Vec<String>> = Vec::new();
        let mut completed: Vec<String> = Vec::new();

        while completed.len() < self.order.len() {
            let ready: Vec<String> = self
                .order
                .iter()
                .filter(|s| !completed.contains(s))
                .filter(|s| self.is_ready(s, &completed))
                .cloned()
                .collect();

            if ready.is_empty() {
                break;
            }

            completed.extend(ready.iter().cloned());
            groups.push(ready);
        }

        Ok(groups)
    }

    /// Check if a step is ready to run given completed steps.
    pub fn is_ready(&self, step: &str, completed: &[String]) -> bool {
        match self.dependencies.get(step) {
            None => true,
            Some(deps) => deps.iter().all(|d| completed.contains(d)),
        }
    }
}

/// Builder for constructing a DependencyGraph.
#[derive(Debug, Default)]
pub struct DependencyGraphBuilder {
    order: Vec<String>,
    dependencies: HashMap<String, Vec<String>>,
}

impl DependencyGraphBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step with its dependencies. A repeated step is ignored.
    pub fn add_step(mut self, name: impl Into<String>, depends_on: Vec<String>) -> Self {
        let name = name.into();
        if self.dependencies.contains_key(&name) {
            return self;
        }

        let mut deps: Vec<String> = Vec::with_capacity(depends_on.len());
        for dep in depends_on {
            if !deps.contains(&dep) {
                deps.push(dep);
            }
        }

        self.order.push(name.clone());
        self.dependencies.insert(name, deps);
        self
    }

    /// Build the dependency graph.
    ///
    /// Unknown dependencies are kept on the dependency side only; they are
    /// reported by [`DependencyGraph::topological_order`].
    pub fn build(self) -> DependencyGraph {
        // Build dependents map (reverse lookup)
        let mut dependents: HashMap<String, Vec<String>> = self
            .order
            .iter()
            .map(|s| (s.clone(), Vec::new()))
            .collect();

        for step in &self.order {
            for dep in &self.dependencies[step] {
                if let Some(list) = dependents.get_mut(dep) {
                    list.push(step.clone());
                }
            }
        }

        DependencyGraph {
            order: self.order,
            dependencies: self.dependencies,
            dependents,
        }
    }
}
