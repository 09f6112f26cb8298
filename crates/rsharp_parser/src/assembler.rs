//! The compilation-unit assembler.
//!
//! Productions attach what they produce to the innermost open scope
//! instead of threading a container argument through every call.
//! `block_start` opens a scope when a production enters a namespace or a
//! type body; `block_end` closes it and hands the collected children back
//! to the production, which embeds them in the node it is finishing.

use rsharp_ast::node::{
    AttributeSection, MemberDeclaration, NamespaceMember, UsingDeclaration,
};

/// One open attachment scope. The compilation unit, each namespace, and
/// each type body get one; which of the lists is populated depends on
/// what the grammar allows at that level.
#[derive(Default)]
pub(crate) struct Scope<'a> {
    pub usings: Vec<UsingDeclaration<'a>>,
    pub attributes: Vec<AttributeSection<'a>>,
    pub namespace_members: Vec<NamespaceMember<'a>>,
    pub members: Vec<MemberDeclaration<'a>>,
}

pub(crate) struct Assembler<'a> {
    stack: Vec<Scope<'a>>,
}

impl<'a> Assembler<'a> {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn block_start(&mut self) {
        self.stack.push(Scope::default());
    }

    pub fn block_end(&mut self) -> Scope<'a> {
        self.stack.pop().expect("assembler scope underflow")
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn top(&mut self) -> &mut Scope<'a> {
        self.stack.last_mut().expect("no open assembler scope")
    }

    pub fn add_using(&mut self, using: UsingDeclaration<'a>) {
        self.top().usings.push(using);
    }

    pub fn add_attribute_section(&mut self, section: AttributeSection<'a>) {
        self.top().attributes.push(section);
    }

    pub fn add_namespace_member(&mut self, member: NamespaceMember<'a>) {
        self.top().namespace_members.push(member);
    }

    pub fn add_member(&mut self, member: MemberDeclaration<'a>) {
        self.top().members.push(member);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsharp_core::Span;

    #[test]
    fn scopes_nest_and_children_stay_ordered() {
        let mut asm = Assembler::new();
        asm.block_start();
        asm.add_using(UsingDeclaration {
            name: "System".into(),
            alias_of: None,
            span: Span::NONE,
        });
        asm.block_start();
        asm.add_using(UsingDeclaration {
            name: "System.Text".into(),
            alias_of: None,
            span: Span::NONE,
        });
        assert_eq!(asm.depth(), 2);

        let inner = asm.block_end();
        assert_eq!(inner.usings.len(), 1);
        assert_eq!(inner.usings[0].name, "System.Text");

        let outer = asm.block_end();
        assert_eq!(outer.usings.len(), 1);
        assert_eq!(outer.usings[0].name, "System");
        assert_eq!(asm.depth(), 0);
    }
}
