/// Declares the property-group catalog.
///
/// Each group expands to:
/// - a resolved struct with one [`SpecifiedValue`](crate::values::SpecifiedValue) per field,
/// - a module holding the group's declaration `Header` and list-field layout,
/// - an [`Aggregate`](crate::properties::Aggregate) impl wiring the group into
///   the declaration store and the cascade arena.
///
/// Once for the whole catalog it also expands [`AggregateTag`],
/// [`DeclaredValues`], [`AggregateStores`], [`CascadeArena`],
/// [`StoredAggregate`] and the tag-based dispatch used by the accumulator.
macro_rules! aggregates {
    (
        $(
            $(#[$meta:meta])*
            $Name:ident, $module:ident, $Storage:ident {
                scalars {
                    $(
                        $(#[$scalar_meta:meta])*
                        $scalar:ident: $Scalar:ty,
                    )*
                }
                lists {
                    $(
                        $(#[$list_meta:meta])*
                        $list:ident: $Item:ty,
                    )*
                }
            }
        )+
    ) => {
        /// Identifies one property group.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            Display, Serialize, Deserialize,
        )]
        pub enum AggregateTag {
            $(
                $(#[$meta])*
                $Name,
            )+
        }

        impl AggregateTag {
            /// Every group, in declaration order.
            pub const ALL: &'static [Self] = &[ $( Self::$Name, )+ ];

            /// Number of property groups.
            pub const COUNT: usize = Self::ALL.len();
        }

        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Default, PartialEq, Serialize)]
            pub struct $Name {
                $(
                    $(#[$scalar_meta])*
                    pub $scalar: SpecifiedValue<$Scalar>,
                )*
                $(
                    $(#[$list_meta])*
                    pub $list: SpecifiedValue<ValueList<$Item>>,
                )*
            }

            #[doc = concat!("Declaration storage for [`", stringify!($Name), "`].")]
            pub mod $module {
                use super::*;

                #[doc = concat!(
                    "One block's declared [`", stringify!($Name), "`] fields for one importance."
                )]
                #[derive(Debug, Clone, Default)]
                pub struct Header {
                    $(
                        pub(crate) $scalar: SpecifiedValue<$Scalar>,
                    )*
                    pub(crate) lists: ListStorage,
                }

                #[allow(non_camel_case_types, dead_code)]
                #[derive(Clone, Copy)]
                pub(crate) enum ListField {
                    $( $list, )*
                }

                #[allow(dead_code)]
                pub(crate) const LIST_LAYOUT: &[FieldLayout] = &[
                    $( FieldLayout::of::<$Item>(), )*
                ];
            }

            impl Aggregate for $Name {
                const TAG: AggregateTag = AggregateTag::$Name;
                type Header = $module::Header;
                type Storage = $Storage;

                fn is_undeclared(&self) -> bool {
                    true
                        $( && self.$scalar.is_undeclared() )*
                        $( && self.$list.is_undeclared() )*
                }

                fn validate(&self) -> Result<(), DeclarationError> {
                    $(
                        list::validate(AggregateTag::$Name, stringify!($list), &self.$list)?;
                    )*
                    Ok(())
                }

                fn write_header(&self, header: &mut Self::Header) -> bool {
                    let mut wrote = false;
                    $(
                        if header.$scalar.is_undeclared() && !self.$scalar.is_undeclared() {
                            header.$scalar.clone_from(&self.$scalar);
                            wrote = true;
                        }
                    )*
                    $(
                        wrote |= header.lists.write(
                            $module::LIST_LAYOUT,
                            $module::ListField::$list as usize,
                            &self.$list,
                        );
                    )*
                    wrote
                }

                fn read_header(&mut self, header: &Self::Header) {
                    $(
                        self.$scalar.fill_from(&header.$scalar);
                    )*
                    $(
                        if self.$list.is_undeclared() {
                            self.$list = header.lists.read(
                                $module::LIST_LAYOUT,
                                $module::ListField::$list as usize,
                            );
                        }
                    )*
                }

                fn fill_with_keyword(&mut self, keyword: CssWideKeyword) {
                    $( self.$scalar.fill_with_keyword(keyword); )*
                    $( self.$list.fill_with_keyword(keyword); )*
                }

                fn store(stores: &AggregateStores) -> &AggregateStore<Self> {
                    &stores.$module
                }

                fn store_mut(stores: &mut AggregateStores) -> &mut AggregateStore<Self> {
                    &mut stores.$module
                }

                fn slab(arena: &CascadeArena) -> &[Self] {
                    &arena.$module
                }

                fn slab_mut(arena: &mut CascadeArena) -> &mut Vec<Self> {
                    &mut arena.$module
                }

                fn wrap(slot: SlotOf<Self>) -> StoredAggregate {
                    StoredAggregate::$Name(slot)
                }

                fn unwrap_ref(stored: &StoredAggregate) -> Option<&SlotOf<Self>> {
                    match stored {
                        StoredAggregate::$Name(slot) => Some(slot),
                        _ => None,
                    }
                }

                fn unwrap_mut(stored: &mut StoredAggregate) -> Option<&mut SlotOf<Self>> {
                    match stored {
                        StoredAggregate::$Name(slot) => Some(slot),
                        _ => None,
                    }
                }
            }

            const _: () = assert!(
                size_of::<$Name>() >= <$Storage as StorageClass>::MIN_SIZE
                    && size_of::<$Name>() <= <$Storage as StorageClass>::MAX_SIZE,
                concat!("wrong storage class for ", stringify!($Name)),
            );
        )+

        /// Declared values for every property group, as handed over by a
        /// stylesheet parser for one declaration block.
        #[derive(Debug, Clone, Default, PartialEq, Serialize)]
        pub struct DeclaredValues {
            $(
                #[doc = concat!("Declared [`", stringify!($Name), "`] fields.")]
                pub $module: $Name,
            )+
        }

        impl DeclaredValues {
            /// Reject malformed list fields before anything is written.
            pub(crate) fn validate(&self) -> Result<(), DeclarationError> {
                $( self.$module.validate()?; )+
                Ok(())
            }

            /// Write every group that declares something into `block`.
            pub(crate) fn write_into(
                &self,
                decls: &mut Declarations,
                block: DeclBlock,
                importance: Importance,
            ) {
                $(
                    if !self.$module.is_undeclared() {
                        decls.write_aggregate(block, importance, &self.$module);
                    }
                )+
            }
        }

        /// Per-group declaration headers of a [`Declarations`] store.
        #[derive(Debug, Default)]
        pub struct AggregateStores {
            $( $module: AggregateStore<$Name>, )+
        }

        /// Transient storage for cascaded groups too large to live inline.
        ///
        /// Reset (not dropped) between cascade runs so its buffers are reused.
        #[derive(Debug, Default)]
        pub struct CascadeArena {
            $( $module: Vec<$Name>, )+
        }

        impl CascadeArena {
            /// Forget every stored group, keeping allocated capacity.
            pub fn reset(&mut self) {
                $( self.$module.clear(); )+
            }

            /// Number of groups currently stored in the arena.
            #[must_use]
            pub fn len(&self) -> usize {
                0 $( + self.$module.len() )+
            }

            /// Whether the arena holds no groups.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }
        }

        /// One cascaded group slot: the group itself when it is small,
        /// otherwise an index into the [`CascadeArena`].
        #[derive(Debug, Clone)]
        pub enum StoredAggregate {
            $(
                #[doc = concat!("Slot for [`", stringify!($Name), "`].")]
                $Name(SlotOf<$Name>),
            )+
        }

        /// Merge one block into the cascaded slot for `tag`.
        pub(crate) fn apply_group(
            tag: AggregateTag,
            cascaded: &mut CascadedValues,
            arena: &mut CascadeArena,
            decls: &Declarations,
            block: DeclBlock,
            importance: Importance,
        ) -> Result<(), TryReserveError> {
            match tag {
                $(
                    AggregateTag::$Name => {
                        cascaded.apply_aggregate::<$Name>(arena, decls, block, importance)
                    }
                )+
            }
        }
    };
}
