use slotmap::new_key_type;

new_key_type! {
    /// Stable handle of an atom inside a [`super::structure::Structure`].
    pub struct AtomId;
    /// Stable handle of a residue inside a [`super::structure::Structure`].
    pub struct ResidueId;
    /// Stable handle of a chain inside a [`super::structure::Structure`].
    pub struct ChainId;
}
