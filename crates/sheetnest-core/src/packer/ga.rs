//! Genetic search over placement order and rotation genes. Fitness is the
//! number of copies a simplified bottom-left fill commits when iteration `i`
//! is forced to rotation gene `i % len`. All randomness flows through one
//! seeded `StdRng`, so identical seeds reproduce identical layouts.

use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::debug;

use super::blf::{place_all, BlfOutcome, RotationPlan};
use super::{max_placements, NestStrategy};
use crate::config::{GaConfig, MainPolygonRule, NestConfig};
use crate::error::Result;
use crate::geometry::polygon_area;
use crate::model::{Design, Placement, SheetPreset};
use crate::pipeline::JobControl;

#[derive(Debug, Clone)]
pub struct Chromosome {
    /// Permutation over 0..n; OX crossover and swap mutation treat order and
    /// rotation genes as one unit per slot.
    pub order: Vec<usize>,
    /// Rotation gene per slot, degrees.
    pub rotations: Vec<f64>,
    /// Placed-copy count from the last evaluation; None when stale.
    pub fitness: Option<usize>,
}

pub struct GaPacker {
    cfg: NestConfig,
}

impl GaPacker {
    pub fn from_config(cfg: &NestConfig) -> Self {
        Self { cfg: cfg.clone() }
    }
}

impl NestStrategy for GaPacker {
    fn name(&self) -> &'static str {
        "nfp-ga"
    }

    fn pack(
        &mut self,
        design: &Design,
        sheet: &SheetPreset,
        ctl: &mut JobControl,
    ) -> Result<Vec<Placement>> {
        let mut search = GeneticSearch::new(design, sheet, &self.cfg);
        search.run(ctl).map(|o| o.placements)
    }
}

pub struct GeneticSearch<'a> {
    design: &'a Design,
    sheet: &'a SheetPreset,
    margin: f64,
    grid_step: Option<f64>,
    rule: MainPolygonRule,
    ga: GaConfig,
    rng: StdRng,
    /// Best chromosome seen across all generations.
    pub best: Option<Chromosome>,
}

impl<'a> GeneticSearch<'a> {
    pub fn new(design: &'a Design, sheet: &'a SheetPreset, cfg: &NestConfig) -> Self {
        let rng = match cfg.ga.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            design,
            sheet,
            margin: cfg.margin,
            grid_step: cfg.grid_step,
            rule: cfg.main_polygon,
            ga: cfg.ga.clone(),
            rng,
            best: None,
        }
    }

    pub fn run(&mut self, ctl: &mut JobControl) -> Result<BlfOutcome> {
        let n = max_placements(self.sheet.area(), self.design.area);
        let degenerate = self.design.polygons.is_empty() || {
            let main = self.design.main_polygon(self.rule);
            main.len() < 3 || polygon_area(main) <= f64::EPSILON
        };
        if n == 0 || degenerate {
            return Ok(BlfOutcome {
                placements: Vec::new(),
                unplaced: Vec::new(),
                efficiency: 0.0,
            });
        }

        let mut population: Vec<Chromosome> = (0..self.ga.population_size)
            .map(|_| self.random_chromosome(n))
            .collect();

        ctl.checkpoint(0.0, "evaluating initial population")?;
        for chromosome in &mut population {
            self.evaluate(chromosome, ctl)?;
        }
        sort_by_fitness(&mut population);
        let mut best_ever = population[0].clone();

        for generation in 0..self.ga.generations {
            let mut next: Vec<Chromosome> = population
                .iter()
                .take(self.ga.elite_count)
                .cloned()
                .collect();
            while next.len() < self.ga.population_size {
                let p1 = self.tournament(&population);
                let p2 = self.tournament(&population);
                let (mut c1, mut c2) = if self.rng.gen::<f64>() < self.ga.crossover_rate {
                    self.order_crossover(&population[p1], &population[p2])
                } else {
                    let mut a = population[p1].clone();
                    let mut b = population[p2].clone();
                    a.fitness = None;
                    b.fitness = None;
                    (a, b)
                };
                self.mutate(&mut c1);
                self.mutate(&mut c2);
                next.push(c1);
                if next.len() < self.ga.population_size {
                    next.push(c2);
                }
            }
            population = next;

            ctl.checkpoint(
                100.0 * generation as f32 / self.ga.generations.max(1) as f32,
                "evaluating generation",
            )?;
            for chromosome in &mut population {
                if chromosome.fitness.is_none() {
                    self.evaluate(chromosome, ctl)?;
                }
            }
            sort_by_fitness(&mut population);
            if population[0].fitness.unwrap_or(0) > best_ever.fitness.unwrap_or(0) {
                best_ever = population[0].clone();
            }
            debug!(
                generation,
                best = best_ever.fitness.unwrap_or(0),
                "generation complete"
            );
        }

        // The returned layout is one final evaluation of the best-ever
        // chromosome, not a remembered intermediate.
        let outcome = self.layout(&best_ever, ctl)?;
        self.best = Some(best_ever);
        Ok(outcome)
    }

    fn random_chromosome(&mut self, n: usize) -> Chromosome {
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut self.rng);
        let rotations = (0..n).map(|_| self.random_rotation()).collect();
        Chromosome {
            order,
            rotations,
            fitness: None,
        }
    }

    fn random_rotation(&mut self) -> f64 {
        let angles = &self.ga.rotation_angles;
        angles[self.rng.gen_range(0..angles.len())]
    }

    /// Best fitness among k uniform draws.
    fn tournament(&mut self, population: &[Chromosome]) -> usize {
        let mut best = self.rng.gen_range(0..population.len());
        for _ in 1..self.ga.tournament_size {
            let contender = self.rng.gen_range(0..population.len());
            if population[contender].fitness.unwrap_or(0) > population[best].fitness.unwrap_or(0)
            {
                best = contender;
            }
        }
        best
    }

    /// Order Crossover: copy the `i1..=i2` slice from one parent, then fill
    /// the remaining slots from the other parent starting after the slice,
    /// skipping order values already present. Membership is tracked with a
    /// per-value vector, never a linear scan.
    fn order_crossover(&mut self, p1: &Chromosome, p2: &Chromosome) -> (Chromosome, Chromosome) {
        let n = p1.order.len();
        let mut i1 = self.rng.gen_range(0..n);
        let mut i2 = self.rng.gen_range(0..n);
        if i1 > i2 {
            std::mem::swap(&mut i1, &mut i2);
        }
        (
            ox_child(p1, p2, i1, i2),
            ox_child(p2, p1, i1, i2),
        )
    }

    fn mutate(&mut self, chromosome: &mut Chromosome) {
        let n = chromosome.order.len();
        let mut changed = false;
        if self.rng.gen::<f64>() < self.ga.mutation_rate && n >= 2 {
            let a = self.rng.gen_range(0..n);
            let b = self.rng.gen_range(0..n);
            if a != b {
                chromosome.order.swap(a, b);
                chromosome.rotations.swap(a, b);
                changed = true;
            }
        }
        for i in 0..n {
            if self.rng.gen::<f64>() < self.ga.mutation_rate {
                chromosome.rotations[i] = self.random_rotation();
                changed = true;
            }
        }
        if changed {
            chromosome.fitness = None;
        }
    }

    fn evaluate(&self, chromosome: &mut Chromosome, ctl: &mut JobControl) -> Result<()> {
        let outcome = self.layout(chromosome, ctl)?;
        chromosome.fitness = Some(outcome.placements.len());
        Ok(())
    }

    fn layout(&self, chromosome: &Chromosome, ctl: &mut JobControl) -> Result<BlfOutcome> {
        place_all(
            self.design,
            self.sheet,
            self.margin,
            self.grid_step,
            self.rule,
            RotationPlan::Sequence(&chromosome.rotations),
            ctl,
        )
    }
}

fn sort_by_fitness(population: &mut [Chromosome]) {
    population.sort_by(|a, b| b.fitness.unwrap_or(0).cmp(&a.fitness.unwrap_or(0)));
}

fn ox_child(keep: &Chromosome, fill: &Chromosome, i1: usize, i2: usize) -> Chromosome {
    let n = keep.order.len();
    let mut order = vec![usize::MAX; n];
    let mut rotations = vec![0.0; n];
    let mut present = vec![false; n];

    for i in i1..=i2 {
        order[i] = keep.order[i];
        rotations[i] = keep.rotations[i];
        present[keep.order[i]] = true;
    }
    let mut pos = (i2 + 1) % n;
    for k in 0..n {
        let j = (i2 + 1 + k) % n;
        let value = fill.order[j];
        if present[value] {
            continue;
        }
        order[pos] = value;
        rotations[pos] = fill.rotations[j];
        present[value] = true;
        pos = (pos + 1) % n;
    }
    Chromosome {
        order,
        rotations,
        fitness: None,
    }
}
