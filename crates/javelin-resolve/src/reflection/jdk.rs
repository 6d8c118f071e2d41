//! The slice of the platform library every resolver can rely on.

use std::sync::OnceLock;

use super::registry::{DeclarationParseError, RuntimeClass, RuntimeRegistry};

const CLASSES: &[(&str, &[&str])] = &[
    (
        "public class java.lang.Object",
        &[
            "public Object()",
            "public boolean equals(Object obj)",
            "public native int hashCode()",
            "public String toString()",
            "public final native Class<?> getClass()",
        ],
    ),
    (
        "public final class java.lang.String implements java.io.Serializable, CharSequence, Comparable<String>",
        &[
            "public String()",
            "public String(String original)",
            "public String(char[] value)",
            "public int length()",
            "public boolean isEmpty()",
            "public char charAt(int index)",
            "public boolean contains(CharSequence s)",
            "public boolean startsWith(String prefix)",
            "public int indexOf(String str)",
            "public String substring(int beginIndex)",
            "public String substring(int beginIndex, int endIndex)",
            "public String concat(String str)",
            "public String trim()",
            "public String toUpperCase()",
            "public String toLowerCase()",
            "public char[] toCharArray()",
            "public int compareTo(String anotherString)",
            "public static String valueOf(Object obj)",
            "public static String valueOf(int i)",
            "public static String format(String format, Object... args)",
            "public static String join(CharSequence delimiter, CharSequence... elements)",
        ],
    ),
    (
        "public interface java.lang.CharSequence",
        &[
            "int length()",
            "char charAt(int index)",
            "CharSequence subSequence(int start, int end)",
            "public String toString()",
        ],
    ),
    (
        "public interface java.io.Serializable",
        &[],
    ),
    (
        "public interface java.lang.Cloneable",
        &[],
    ),
    (
        "public interface java.lang.Comparable<T>",
        &["int compareTo(T o)"],
    ),
    (
        "public interface java.lang.Iterable<T>",
        &["default void forEach(Consumer<? super T> action)"],
    ),
    (
        "public interface java.lang.Runnable",
        &["void run()"],
    ),
    (
        "public abstract class java.lang.Number implements java.io.Serializable",
        &[
            "public Number()",
            "public abstract int intValue()",
            "public abstract long longValue()",
            "public abstract double doubleValue()",
        ],
    ),
    (
        "public final class java.lang.Integer extends Number implements Comparable<Integer>",
        &[
            "public static final int MAX_VALUE",
            "public static final int MIN_VALUE",
            "public Integer(int value)",
            "public int intValue()",
            "public long longValue()",
            "public double doubleValue()",
            "public int compareTo(Integer anotherInteger)",
            "public static Integer valueOf(int i)",
            "public static int parseInt(String s)",
            "public static String toString(int i)",
        ],
    ),
    (
        "public final class java.lang.Long extends Number implements Comparable<Long>",
        &[
            "public static final long MAX_VALUE",
            "public Long(long value)",
            "public int intValue()",
            "public long longValue()",
            "public double doubleValue()",
            "public int compareTo(Long anotherLong)",
            "public static Long valueOf(long l)",
            "public static long parseLong(String s)",
        ],
    ),
    (
        "public final class java.lang.Double extends Number implements Comparable<Double>",
        &[
            "public Double(double value)",
            "public int intValue()",
            "public long longValue()",
            "public double doubleValue()",
            "public int compareTo(Double anotherDouble)",
            "public static Double valueOf(double d)",
            "public static double parseDouble(String s)",
        ],
    ),
    (
        "public final class java.lang.Float extends Number implements Comparable<Float>",
        &["public float floatValue()", "public static Float valueOf(float f)"],
    ),
    (
        "public final class java.lang.Short extends Number implements Comparable<Short>",
        &["public short shortValue()", "public static Short valueOf(short s)"],
    ),
    (
        "public final class java.lang.Byte extends Number implements Comparable<Byte>",
        &["public byte byteValue()", "public static Byte valueOf(byte b)"],
    ),
    (
        "public final class java.lang.Boolean implements java.io.Serializable, Comparable<Boolean>",
        &[
            "public static final Boolean TRUE",
            "public static final Boolean FALSE",
            "public boolean booleanValue()",
            "public static Boolean valueOf(boolean b)",
            "public static boolean parseBoolean(String s)",
        ],
    ),
    (
        "public final class java.lang.Character implements java.io.Serializable, Comparable<Character>",
        &[
            "public char charValue()",
            "public static Character valueOf(char c)",
            "public static boolean isDigit(char ch)",
            "public static boolean isLetter(char ch)",
        ],
    ),
    (
        "public final class java.lang.Class<T>",
        &[
            "public String getName()",
            "public String getSimpleName()",
            "public boolean isInstance(Object obj)",
            "public T cast(Object obj)",
        ],
    ),
    (
        "public abstract class java.lang.Enum<E extends Enum<E>> implements Comparable<E>, java.io.Serializable",
        &[
            "protected Enum(String name, int ordinal)",
            "public final String name()",
            "public final int ordinal()",
            "public final int compareTo(E o)",
        ],
    ),
    (
        "public class java.lang.Throwable implements java.io.Serializable",
        &[
            "public Throwable()",
            "public Throwable(String message)",
            "public String getMessage()",
            "public void printStackTrace()",
        ],
    ),
    (
        "public class java.lang.Exception extends Throwable",
        &["public Exception()", "public Exception(String message)"],
    ),
    (
        "public class java.lang.RuntimeException extends Exception",
        &["public RuntimeException()", "public RuntimeException(String message)"],
    ),
    (
        "public final class java.lang.System",
        &[
            "public static final PrintStream out",
            "public static final PrintStream err",
            "public static long currentTimeMillis()",
            "public static String getProperty(String key)",
        ],
    ),
    (
        "public final class java.lang.Math",
        &[
            "public static final double PI",
            "public static int abs(int a)",
            "public static double abs(double a)",
            "public static int max(int a, int b)",
            "public static long max(long a, long b)",
            "public static int min(int a, int b)",
            "public static double sqrt(double a)",
        ],
    ),
    (
        "public class java.io.PrintStream",
        &[
            "public void println()",
            "public void println(boolean x)",
            "public void println(int x)",
            "public void println(String x)",
            "public void println(Object x)",
            "public void print(String s)",
            "public PrintStream printf(String format, Object... args)",
        ],
    ),
    (
        "public interface java.util.Collection<E> extends Iterable<E>",
        &[
            "int size()",
            "boolean isEmpty()",
            "boolean contains(Object o)",
            "boolean add(E e)",
            "boolean remove(Object o)",
            "Object[] toArray()",
            "default Stream<E> stream()",
        ],
    ),
    (
        "public interface java.util.List<E> extends Collection<E>",
        &[
            "E get(int index)",
            "E set(int index, E element)",
            "boolean add(E e)",
            "void add(int index, E element)",
            "int indexOf(Object o)",
            "static <E> List<E> of(E... elements)",
        ],
    ),
    (
        "public class java.util.ArrayList<E> implements List<E>, Cloneable, java.io.Serializable",
        &[
            "public ArrayList()",
            "public ArrayList(int initialCapacity)",
            "public ArrayList(Collection<? extends E> c)",
            "public E get(int index)",
            "public boolean add(E e)",
            "public int size()",
        ],
    ),
    (
        "public interface java.util.Map<K, V>",
        &[
            "int size()",
            "boolean containsKey(Object key)",
            "V get(Object key)",
            "V put(K key, V value)",
            "V remove(Object key)",
            "Collection<V> values()",
            "default V getOrDefault(Object key, V defaultValue)",
        ],
    ),
    (
        "public class java.util.HashMap<K, V> implements Map<K, V>, Cloneable, java.io.Serializable",
        &[
            "public HashMap()",
            "public HashMap(int initialCapacity)",
            "public V get(Object key)",
            "public V put(K key, V value)",
        ],
    ),
    (
        "public final class java.util.Optional<T>",
        &[
            "public static <T> Optional<T> empty()",
            "public static <T> Optional<T> of(T value)",
            "public T get()",
            "public boolean isPresent()",
            "public T orElse(T other)",
            "public Optional<T> filter(Predicate<? super T> predicate)",
            "public <U> Optional<U> map(Function<? super T, ? extends U> mapper)",
        ],
    ),
    (
        "public class java.util.Arrays",
        &[
            "public static <T> List<T> asList(T... a)",
            "public static String toString(int[] a)",
            "public static String toString(Object[] a)",
        ],
    ),
    (
        "public interface java.util.stream.Stream<T>",
        &[
            "Stream<T> filter(Predicate<? super T> predicate)",
            "<R> Stream<R> map(Function<? super T, ? extends R> mapper)",
            "void forEach(Consumer<? super T> action)",
            "Optional<T> findFirst()",
            "long count()",
            "static <T> Stream<T> of(T... values)",
        ],
    ),
    (
        "public interface java.util.function.Predicate<T>",
        &["boolean test(T t)", "default Predicate<T> negate()"],
    ),
    (
        "public interface java.util.function.Function<T, R>",
        &[
            "R apply(T t)",
            "default <V> Function<T, V> andThen(Function<? super R, ? extends V> after)",
        ],
    ),
    (
        "public interface java.util.function.Supplier<T>",
        &["T get()"],
    ),
    (
        "public interface java.util.function.Consumer<T>",
        &[
            "void accept(T t)",
            "default Consumer<T> andThen(Consumer<? super T> after)",
        ],
    ),
];

fn parse_catalog() -> Result<RuntimeRegistry, DeclarationParseError> {
    let classes = CLASSES
        .iter()
        .map(|(header, members)| RuntimeClass::parse(header, members))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RuntimeRegistry::from_classes(classes))
}

/// The built-in platform classes, parsed once per process.
pub fn jdk() -> &'static RuntimeRegistry {
    static JDK: OnceLock<RuntimeRegistry> = OnceLock::new();
    JDK.get_or_init(|| parse_catalog().expect("built-in platform declarations are well formed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn catalog_parses() {
        let registry = parse_catalog().unwrap();
        assert_eq!(registry.len(), CLASSES.len());
        assert!(registry.get("java.util.function.Predicate").is_some());
    }

    #[test]
    fn member_types_point_into_the_catalog() {
        let system = jdk().get("java.lang.System").unwrap();
        assert_eq!(system.fields()[0].ty.to_string(), "java.io.PrintStream");
        let stream = jdk().get("java.util.stream.Stream").unwrap();
        let map = stream.methods().iter().find(|m| m.name == "map").unwrap();
        assert_eq!(
            map.params[0].ty.to_string(),
            "java.util.function.Function<? super T, ? extends R>"
        );
    }
}
