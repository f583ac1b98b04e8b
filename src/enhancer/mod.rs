// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Expression enhancement
//!
//! Enhancers rewrite the raw text of a template before it is parsed. The
//! standard chain holds one [`VariableFunctionEnhancer`], which expands
//! shorthand variable functions such as `${var:eq(status, 'open')}` into
//! canonical calls with the evaluation scope injected.

#![warn(missing_docs)]

mod scan;
mod variables;

pub use variables::{Shorthand, VariableFunctionEnhancer};

use std::fmt;
use std::sync::Arc;

use log::debug;

/// A textual rewrite applied to templates before parsing
pub trait ExpressionEnhancer: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Rewrite `template`; text the enhancer does not recognize is returned
    /// unchanged
    fn enhance(&self, template: &str) -> String;
}

/// Ordered list of enhancers, each fed the previous one's output
#[derive(Clone, Default)]
pub struct EnhancerChain {
    enhancers: Vec<Arc<dyn ExpressionEnhancer>>,
}

impl EnhancerChain {
    /// Chain without any enhancer
    pub fn empty() -> Self {
        Self::default()
    }

    /// Chain with the variable function enhancer injecting `scope_variable`
    pub fn standard(scope_variable: impl Into<String>) -> Self {
        let mut chain = Self::empty();
        chain.push(VariableFunctionEnhancer::new(scope_variable));
        chain
    }

    /// Append an enhancer
    pub fn push<E: ExpressionEnhancer + 'static>(&mut self, enhancer: E) {
        self.enhancers.push(Arc::new(enhancer));
    }

    /// Append a shared enhancer
    pub fn push_shared(&mut self, enhancer: Arc<dyn ExpressionEnhancer>) {
        self.enhancers.push(enhancer);
    }

    /// Number of enhancers
    pub fn len(&self) -> usize {
        self.enhancers.len()
    }

    /// Whether the chain is empty
    pub fn is_empty(&self) -> bool {
        self.enhancers.is_empty()
    }

    /// Names in application order
    pub fn names(&self) -> Vec<&str> {
        self.enhancers.iter().map(|e| e.name()).collect()
    }

    /// Run every enhancer in order
    pub fn enhance(&self, template: &str) -> String {
        let mut text = template.to_string();
        for enhancer in &self.enhancers {
            let rewritten = enhancer.enhance(&text);
            if rewritten != text {
                debug!("{} rewrote '{text}' to '{rewritten}'", enhancer.name());
                text = rewritten;
            }
        }
        text
    }
}

impl fmt::Debug for EnhancerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
