/// Check labels clazy prints in brackets after a warning, unsorted.
pub const CLAZY_CHECKS: &[&str] = &[
    "[-Wclazy-assert-with-side-effects]",
    "[-Wclazy-container-inside-loop]",
    "[-Wclazy-detaching-member]",
    "[-Wclazy-heap-allocated-small-trivial-type]",
    "[-Wclazy-ifndef-define-typo]",
    "[-Wclazy-inefficient-qlist]",
    "[-Wclazy-isempty-vs-count]",
    "[-Wclazy-jni-signatures]",
    "[-Wclazy-qhash-with-char-pointer-key]",
    "[-Wclazy-qproperty-type-mismatch]",
    "[-Wclazy-qrequiredresult-candidates]",
    "[-Wclazy-qstring-varargs]",
    "[-Wclazy-qt-keywords]",
    "[-Wclazy-qt4-qstring-from-array]",
    "[-Wclazy-qt6-qdir-fixes]",
    "[-Wclazy-qt6-qhash-signature]",
    "[-Wclazy-qt6-qlatin1char-to-u]",
    "[-Wclazy-qt6-qlatin1string-to-u]",
    "[-Wclazy-qvariant-template-instantiation]",
    "[-Wclazy-raw-environment-function]",
    "[-Wclazy-reserve-candidates]",
    "[-Wclazy-signal-with-return-value]",
    "[-Wclazy-thread-with-slots]",
    "[-Wclazy-tr-non-literal]",
    "[-Wclazy-unneeded-cast]",
    "[-Wclazy-use-chrono-in-qtimer]",
    "[-Wclazy-connect-by-name]",
    "[-Wclazy-connect-non-signal]",
    "[-Wclazy-connect-not-normalized]",
    "[-Wclazy-container-anti-pattern]",
    "[-Wclazy-empty-qstringliteral]",
    "[-Wclazy-fully-qualified-moc-types]",
    "[-Wclazy-lambda-in-connect]",
    "[-Wclazy-lambda-unique-connection]",
    "[-Wclazy-lowercase-qml-type-name]",
    "[-Wclazy-mutable-container-key]",
    "[-Wclazy-overloaded-signal]",
    "[-Wclazy-qcolor-from-literal]",
    "[-Wclazy-qdatetime-utc]",
    "[-Wclazy-qenums]",
    "[-Wclazy-qfileinfo-exists]",
    "[-Wclazy-qgetenv]",
    "[-Wclazy-qmap-with-pointer-key]",
    "[-Wclazy-qstring-arg]",
    "[-Wclazy-qstring-comparison-to-implicit-char]",
    "[-Wclazy-qstring-insensitive-allocation]",
    "[-Wclazy-qstring-ref]",
    "[-Wclazy-qt-macros]",
    "[-Wclazy-strict-iterators]",
    "[-Wclazy-temporary-iterator]",
    "[-Wclazy-unused-non-trivial-variable]",
    "[-Wclazy-writing-to-temporary]",
    "[-Wclazy-wrong-qevent-cast]",
    "[-Wclazy-wrong-qglobalstatic]",
    "[-Wclazy-auto-unexpected-qstringbuilder]",
    "[-Wclazy-child-event-qobject-cast]",
    "[-Wclazy-connect-3arg-lambda]",
    "[-Wclazy-const-signal-or-slot]",
    "[-Wclazy-detaching-temporary]",
    "[-Wclazy-foreach]",
    "[-Wclazy-incorrect-emit]",
    "[-Wclazy-inefficient-qlist-soft]",
    "[-Wclazy-install-event-filter]",
    "[-Wclazy-non-pod-global-static]",
    "[-Wclazy-overridden-signal]",
    "[-Wclazy-post-event]",
    "[-Wclazy-qdeleteall]",
    "[-Wclazy-qhash-namespace]",
    "[-Wclazy-qlatin1string-non-ascii]",
    "[-Wclazy-qproperty-without-notify]",
    "[-Wclazy-qstring-left]",
    "[-Wclazy-range-loop]",
    "[-Wclazy-returning-data-from-temporary]",
    "[-Wclazy-rule-of-two-soft]",
    "[-Wclazy-skipped-base-method]",
    "[-Wclazy-virtual-signal]",
    "[-Wclazy-base-class-event]",
    "[-Wclazy-copyable-polymorphic]",
    "[-Wclazy-ctor-missing-parent-argument]",
    "[-Wclazy-function-args-by-ref]",
    "[-Wclazy-function-args-by-value]",
    "[-Wclazy-global-const-char-pointer]",
    "[-Wclazy-implicit-casts]",
    "[-Wclazy-missing-qobject-macro]",
    "[-Wclazy-missing-typeinfo]",
    "[-Wclazy-old-style-connect]",
    "[-Wclazy-qstring-allocations]",
    "[-Wclazy-returning-void-expression]",
    "[-Wclazy-rule-of-three]",
    "[-Wclazy-static-pmf]",
    "[-Wclazy-virtual-call-ctor]",
];

/// Lexicographically sorted set of category labels. Report order follows this order.
#[derive(Clone, Debug)]
pub struct Catalog {
    labels: Vec<String>,
}

impl Catalog {
    pub fn builtin() -> Self { Self::new(CLAZY_CHECKS.iter().copied()) }

    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        labels.sort();
        labels.dedup();
        Self { labels }
    }

    pub fn labels(&self) -> &[String] { &self.labels }

    pub fn len(&self) -> usize { self.labels.len() }
}

/// Label text without its surrounding brackets, as shown in panel headings.
pub fn display_name(label: &str) -> &str {
    label
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_is_sorted_and_complete() {
        let c = Catalog::builtin();
        assert_eq!(c.len(), CLAZY_CHECKS.len());
        assert!(c.labels().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(c.labels()[0], "[-Wclazy-assert-with-side-effects]");
    }

    #[test]
    fn new_sorts_and_dedups() {
        let c = Catalog::new(["[b]", "[a]", "[b]"]);
        assert_eq!(c.labels(), &["[a]".to_string(), "[b]".to_string()]);
    }

    #[test]
    fn old_style_connect_label_matches_real_warnings() {
        let line = "w.cpp:4:5: warning: Old Style Connect [-Wclazy-old-style-connect]";
        let c = Catalog::builtin();
        assert!(c.labels().iter().any(|l| line.contains(l.as_str())));
    }

    #[test]
    fn display_name_strips_brackets() {
        assert_eq!(display_name("[-Wclazy-foreach]"), "-Wclazy-foreach");
        assert_eq!(display_name("no-brackets"), "no-brackets");
    }
}
