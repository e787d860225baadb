//! The immutable puzzle model: variables and the overlaps between them

use super::{Direction, PuzzleError, Structure, Variable, VariableId};
use itertools::Itertools;
use std::collections::HashMap;
use std::ops::Range;

/// Variables and overlap constraints derived once from a grid structure
#[derive(Debug, Clone)]
pub struct Crossword {
    structure: Structure,
    /// Sorted by `(row, col, direction)`, which doubles as the tie-break order
    variables: Vec<Variable>,
    /// Keyed by ordered pair; both orderings are present for every crossing
    overlaps: HashMap<(VariableId, VariableId), (usize, usize)>,
    neighbors: Vec<Vec<VariableId>>,
}

impl Crossword {
    /// Build the model from a structure
    pub fn new(structure: Structure) -> Self {
        let variables = Self::find_variables(&structure);

        let mut overlaps = HashMap::new();
        let mut neighbors = vec![Vec::new(); variables.len()];

        for (x, y) in (0..variables.len()).tuple_combinations() {
            if let Some((i, j)) = Self::shared_cell(&variables[x], &variables[y]) {
                overlaps.insert((x, y), (i, j));
                overlaps.insert((y, x), (j, i));
                neighbors[x].push(y);
                neighbors[y].push(x);
            }
        }

        for list in &mut neighbors {
            list.sort_unstable();
        }

        Self {
            structure,
            variables,
            overlaps,
            neighbors,
        }
    }

    /// Build the model from rows of open flags
    pub fn from_cells(cells: Vec<Vec<bool>>) -> Result<Self, PuzzleError> {
        Ok(Self::new(Structure::from_cells(cells)?))
    }

    /// Every maximal horizontal or vertical run of two or more open cells
    fn find_variables(structure: &Structure) -> Vec<Variable> {
        let mut variables = Vec::new();

        for row in 0..structure.height {
            for col in 0..structure.width {
                if !structure.is_open(row, col) {
                    continue;
                }

                let starts_across = col == 0 || !structure.is_open(row, col - 1);
                if starts_across {
                    let length = (col..structure.width)
                        .take_while(|&c| structure.is_open(row, c))
                        .count();
                    if length > 1 {
                        variables.push(Variable::new(row, col, Direction::Across, length));
                    }
                }

                let starts_down = row == 0 || !structure.is_open(row - 1, col);
                if starts_down {
                    let length = (row..structure.height)
                        .take_while(|&r| structure.is_open(r, col))
                        .count();
                    if length > 1 {
                        variables.push(Variable::new(row, col, Direction::Down, length));
                    }
                }
            }
        }

        variables.sort_unstable();
        variables
    }

    fn shared_cell(x: &Variable, y: &Variable) -> Option<(usize, usize)> {
        x.cells()
            .enumerate()
            .find_map(|(i, cell)| y.position_of(cell).map(|j| (i, j)))
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn width(&self) -> usize {
        self.structure.width
    }

    pub fn height(&self) -> usize {
        self.structure.height
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id]
    }

    /// All variable ids, in tie-break order
    pub fn ids(&self) -> Range<VariableId> {
        0..self.variables.len()
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Look up the id of a variable by value
    pub fn id_of(&self, variable: &Variable) -> Option<VariableId> {
        self.variables.binary_search(variable).ok()
    }

    /// Letter positions `(i, j)` that must agree between `x` and `y`, if they cross
    pub fn overlap(&self, x: VariableId, y: VariableId) -> Option<(usize, usize)> {
        self.overlaps.get(&(x, y)).copied()
    }

    pub fn neighbors(&self, x: VariableId) -> &[VariableId] {
        &self.neighbors[x]
    }

    pub fn degree(&self, x: VariableId) -> usize {
        self.neighbors[x].len()
    }

    /// Every ordered pair of crossing variables, sorted
    pub fn arcs(&self) -> Vec<(VariableId, VariableId)> {
        self.overlaps.keys().copied().sorted_unstable().collect()
    }

    /// Number of crossing cells (unordered overlaps)
    pub fn overlap_count(&self) -> usize {
        self.overlaps.len() / 2
    }
}
