use standin::{
    matcher, Arg, CallEvent, ChainDeclaration, Declaration, Error, Expression, MalformedChain,
    Repository, Returned, SetupHandle, Step, SubstituteId,
};

fn inner_of(repository: &Repository, substitute: SubstituteId, call: &CallEvent) -> SubstituteId {
    repository
        .resolve(substitute, call)
        .unwrap()
        .into_result()
        .unwrap()
        .inner_mock()
        .unwrap()
}

#[test]
fn decomposes_into_single_steps() {
    let repository = Repository::new();
    let root = repository.create("root");

    let chain = ChainDeclaration::new(vec![
        Step::property("A"),
        Step::property("B"),
        Step::method("C", (matcher::eq(1),)),
    ])
    .returns("done");
    let id = repository.setup_chain(root, chain).unwrap();
    let fluent = repository.fluent(id).unwrap();

    assert_eq!(fluent.to_string(), "root.A.B.C(1)");
    assert_eq!(fluent.root(), root);
    assert_eq!(fluent.steps().len(), 3);
    assert_eq!(repository.substitutes_len(), 3);

    for &step in fluent.steps() {
        let info = repository.setup_info(step).unwrap();
        assert_eq!(info.original_setup(), SetupHandle::Fluent(id));
    }

    let s1 = inner_of(&repository, root, &CallEvent::property("A"));
    let s2 = inner_of(&repository, s1, &CallEvent::property("B"));
    assert_eq!(&*repository.substitute_name(s1).unwrap(), "root.A");
    assert_eq!(&*repository.substitute_name(s2).unwrap(), "root.A.B");

    let call = CallEvent::method("C", (1,));
    let resolved = repository.resolve(s2, &call).unwrap().into_result().unwrap();
    assert_eq!(Some(resolved.setup()), fluent.last_step());
    assert_eq!(resolved.response().produce(&call), Returned::Value(Arg::new("done")));
}

#[test]
fn reuses_inner_substitutes_of_a_prefix() {
    let repository = Repository::new();
    let root = repository.create("root");

    let first = repository
        .setup_chain(
            root,
            ChainDeclaration::new(vec![Step::property("A"), Step::method("B", (matcher::eq(1),))])
                .returns(1),
        )
        .unwrap();
    let second = repository
        .setup_chain(
            root,
            ChainDeclaration::new(vec![Step::property("A"), Step::method("B", (matcher::eq(2),))])
                .returns(2),
        )
        .unwrap();

    // a single inner substitute for `root.A`
    assert_eq!(repository.substitutes_len(), 2);
    assert_eq!(repository.setups(root).unwrap().len(), 1);

    let first = repository.fluent(first).unwrap();
    let second = repository.fluent(second).unwrap();
    assert_eq!(first.steps()[0], second.steps()[0]);
    assert_ne!(first.steps()[1], second.steps()[1]);

    // both final steps live side by side on the inner substitute
    let inner = inner_of(&repository, root, &CallEvent::property("A"));
    let setups = repository.setups(inner).unwrap();
    assert_eq!(setups.len(), 2);
    assert!(setups.iter().all(|info| !info.is_overridden()));

    assert!(repository.resolve(inner, &CallEvent::method("B", (1,))).unwrap().is_handled());
    assert!(repository.resolve(inner, &CallEvent::method("B", (2,))).unwrap().is_handled());
}

#[test]
fn redeclaring_the_full_chain_overrides_the_last_step() {
    let repository = Repository::new();
    let root = repository.create("root");
    let chain = || ChainDeclaration::new(vec![Step::property("A"), Step::property("B")]);

    let first = repository.setup_chain(root, chain().returns(1)).unwrap();
    let second = repository.setup_chain(root, chain().returns(2)).unwrap();

    let first = repository.fluent(first).unwrap();
    let second = repository.fluent(second).unwrap();
    assert!(repository.setup_info(first.steps()[1]).unwrap().is_overridden());
    assert!(!repository.setup_info(second.steps()[1]).unwrap().is_overridden());
}

#[test]
fn prefix_overridden_by_a_plain_value_gets_a_new_inner_substitute() {
    let repository = Repository::new();
    let root = repository.create("root");
    let chain = || ChainDeclaration::new(vec![Step::property("A"), Step::property("B")]);

    repository.setup_chain(root, chain()).unwrap();
    repository
        .setup(root, Declaration::new(Expression::property("A")).returns(0))
        .unwrap();
    repository.setup_chain(root, chain()).unwrap();

    assert_eq!(repository.substitutes_len(), 3);
    let setups = repository.setups(root).unwrap();
    assert_eq!(setups.len(), 3);
    assert!(setups[0].is_overridden());
    assert!(setups[1].is_overridden());
    assert!(!setups[2].is_overridden());
}

#[test]
fn prefix_returning_a_foreign_substitute_gets_a_new_inner_substitute() {
    let repository = Repository::new();
    let root = repository.create("root");

    let other = Repository::new();
    other.create("a");
    other.create("b");
    let foreign = other.create("c");

    let plain = repository
        .setup(root, Declaration::new(Expression::property("A")).returns_substitute(foreign))
        .unwrap();

    let chain = ChainDeclaration::new(vec![Step::property("A"), Step::property("B")]);
    let fluent = repository.setup_chain(root, chain).unwrap();
    let steps = repository.fluent(fluent).unwrap().steps().to_vec();

    assert_ne!(steps[0], plain);
    assert!(repository.setup_info(plain).unwrap().is_overridden());
    assert_eq!(repository.substitutes_len(), 2);

    let inner = inner_of(&repository, root, &CallEvent::property("A"));
    assert_eq!(repository.substitute_name(inner).unwrap().as_ref(), "root.A");
    assert_eq!(steps[1].owner(), inner);
}

#[test]
fn guard_and_verifiable_flag() {
    let repository = Repository::new();
    let root = repository.create("root");

    let id = repository
        .setup_chain(
            root,
            ChainDeclaration::new(vec![Step::property("A")])
                .then(Expression::method("go", ()))
                .when(|| true)
                .verifiable(),
        )
        .unwrap();
    let fluent = repository.fluent(id).unwrap();

    let prefix = repository.setup_info(fluent.steps()[0]).unwrap();
    let last = repository.setup_info(fluent.steps()[1]).unwrap();
    assert!(!prefix.is_conditional());
    assert!(last.is_conditional());
    assert!(prefix.is_verifiable());
    assert!(last.is_verifiable());
}

#[test]
fn indexers_attach_to_the_previous_step() {
    let repository = Repository::new();
    let root = repository.create("root");

    let id = repository
        .setup_chain(
            root,
            ChainDeclaration::new(vec![
                Step::property("Items"),
                Step::indexer((matcher::eq(0_usize),)),
                Step::property("Name"),
            ]),
        )
        .unwrap();

    assert_eq!(repository.fluent(id).unwrap().to_string(), "root.Items[0].Name");
}

#[test]
fn single_step_chain() {
    let repository = Repository::new();
    let root = repository.create("root");

    let id = repository
        .setup_chain(root, ChainDeclaration::new(vec![Step::property("A")]).returns(5))
        .unwrap();

    let fluent = repository.fluent(id).unwrap();
    assert_eq!(fluent.steps().len(), 1);
    assert_eq!(fluent.steps()[0].owner(), root);
    assert_eq!(repository.substitutes_len(), 1);
}

#[test]
fn rejects_non_member_steps_before_registering() {
    let repository = Repository::new();
    let root = repository.create("root");

    let result = repository.setup_chain(
        root,
        ChainDeclaration::new(vec![
            Step::property("A"),
            Step::other("(B as Bar)"),
            Step::property("C"),
        ]),
    );

    match result {
        Err(Error::MalformedChain(MalformedChain::NotAMemberAccess { position, step })) => {
            assert_eq!(position, 1);
            assert_eq!(step, "(B as Bar)");
        }
        other => panic!("expected a malformed chain, got {:?}", other),
    }

    assert!(repository.setups(root).unwrap().is_empty());
    assert_eq!(repository.substitutes_len(), 1);
}

#[test]
fn rejects_empty_chains() {
    let repository = Repository::new();
    let root = repository.create("root");

    let error = repository
        .setup_chain(root, ChainDeclaration::new(vec![]))
        .unwrap_err();
    assert!(matches!(error, Error::MalformedChain(MalformedChain::Empty)));
}
