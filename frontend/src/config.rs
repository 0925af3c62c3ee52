/// How primitives with both a gate-level and a word-level form are lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lowering {
    /// One word-level cell per primitive or operator.
    #[default]
    Cells,
    /// Single-bit gates only; operators are kept as hierarchical cells.
    Gates,
}

#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    pub lowering: Lowering,
    /// Keep unsupported primitives as black box cells, and drop unsupported temporal
    /// operators, with a warning instead of an error.
    pub keep_going: bool,
    /// Do not compile assertion properties or past-value samplers.
    pub no_sva: bool,
    /// Do not run the property preprocessor.  Implies `no_sva`.
    pub no_preprocess: bool,
    /// Preserve the names of all nets and instances, not only of user-declared ones.
    pub names: bool,
    pub verbose: bool,
    /// Route hierarchical net references through new ports before importing.
    pub resolve_external_nets: bool,
    /// Let the preprocessor rewrite `a |=> b` into `a ##1 b` inside cover properties.
    pub rewrite_cover_implications: bool,
}

impl ImportConfig {
    pub fn sva_enabled(&self) -> bool {
        !self.no_sva && !self.no_preprocess
    }
}
