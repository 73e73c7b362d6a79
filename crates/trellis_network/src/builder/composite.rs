//! Existential and accumulate patterns.
//!
//! Both consume the tuple stream and a freshly filtered object stream, and
//! both need a tuple stream even as a rule's first pattern.

use trellis_foundation::Result;
use trellis_model::{AccumulateBinding, ExistentialKind};

use super::ReteBuilder;
use crate::context::BuildContext;
use crate::node::{AccumulateSpec, BetaConstraints};

impl ReteBuilder {
    /// Builds a `not` or `exists` node over the current cursors.
    ///
    /// The pattern's variable is never visible downstream, but it still
    /// claims a tuple offset.
    pub(super) fn build_existential(
        &mut self,
        kind: ExistentialKind,
        constraints: BetaConstraints,
        ctx: &mut BuildContext,
    ) -> Result<()> {
        let what = match kind {
            ExistentialKind::Exists => "exists",
            ExistentialKind::Not => "not",
        };
        let tuple = ctx.require_tuple_cursor(what)?;
        let object = ctx.require_object_cursor(what)?;

        let id = self.ids.next_id()?;
        let node = match kind {
            ExistentialKind::Exists => self.factory.create_exists(id, tuple, object, constraints)?,
            ExistentialKind::Not => self.factory.create_not(id, tuple, object, constraints)?,
        };
        let id = self.place(node, self.config.share_beta_nodes)?;
        ctx.absorb(id);
        ctx.reserve_offset();
        Ok(())
    }

    /// Builds an accumulate node folding the matching objects of each tuple.
    ///
    /// Each binding's result variable gets its own offset, in declaration
    /// order. The source binder carries the pattern's beta constraints and
    /// the results binder is left empty.
    pub(super) fn build_accumulate(
        &mut self,
        bindings: &[AccumulateBinding],
        constraints: BetaConstraints,
        ctx: &mut BuildContext,
    ) -> Result<()> {
        let tuple = ctx.require_tuple_cursor("accumulate")?;
        let object = ctx.require_object_cursor("accumulate")?;

        let functions: Vec<AccumulateSpec> = bindings
            .iter()
            .map(|binding| AccumulateSpec {
                function: binding.function.clone(),
                offset: ctx.bind(&binding.result),
            })
            .collect();

        let node = self.factory.create_accumulate(
            self.ids.next_id()?,
            tuple,
            object,
            constraints,
            BetaConstraints::new(),
            functions,
        )?;
        let id = self.place(node, self.config.share_beta_nodes)?;
        ctx.absorb(id);
        Ok(())
    }
}
